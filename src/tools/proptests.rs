//! Property tests for the dispatcher's cardinality guarantee

use super::{ToolDispatcher, TurnToolCache};
use crate::assistant::{FunctionCall, ToolCall};
use crate::engine::testing::CountingImageModel;
use proptest::prelude::*;
use std::sync::Arc;

fn arb_call(index: usize, name: String, arguments: String) -> ToolCall {
    ToolCall {
        id: format!("call_{index}"),
        function: FunctionCall { name, arguments },
    }
}

proptest! {
    /// Every batch yields exactly one output per call, ids preserved in
    /// order, regardless of name mix, repeats, or argument garbage.
    #[test]
    fn one_output_per_call(
        specs in prop::collection::vec(
            (
                prop_oneof![
                    Just("generate_image".to_string()),
                    Just("generate_career_visualization".to_string()),
                    "[a-z_]{1,16}",
                ],
                prop_oneof![
                    Just(r#"{"prompt":"sunset","career_field":"zorg"}"#.to_string()),
                    Just("{}".to_string()),
                    Just("{not json".to_string()),
                ],
            ),
            0..12,
        )
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");

        rt.block_on(async {
            let dispatcher = ToolDispatcher::standard(Arc::new(CountingImageModel::default()));
            let mut cache = TurnToolCache::default();
            let calls: Vec<ToolCall> = specs
                .into_iter()
                .enumerate()
                .map(|(i, (name, arguments))| arb_call(i, name, arguments))
                .collect();

            let outputs = dispatcher.dispatch_batch(&calls, &mut cache).await;

            prop_assert_eq!(outputs.len(), calls.len());
            for (call, output) in calls.iter().zip(&outputs) {
                prop_assert_eq!(&call.id, &output.tool_call_id);
                prop_assert!(!output.output.is_empty());
            }
            Ok(())
        })?;
    }
}
