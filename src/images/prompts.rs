//! Career-field prompt table
//!
//! Maps study/career fields (and common role synonyms) to portrait and
//! photo-edit prompts. Matching is substring-based so "hbo verpleegkunde"
//! still hits the nursing entry.

/// Edit prompts: transform an uploaded photo into the field's professional.
const TRANSFORM_PROMPTS: &[(&str, &str)] = &[
    ("verpleegkunde", "Transform this person into a professional nurse wearing modern medical scrubs, with a confident and caring expression, in a medical setting"),
    ("fysiotherapie", "Transform this person into a professional physiotherapist wearing appropriate medical attire, looking confident and knowledgeable"),
    ("zorg", "Transform this person into a confident healthcare professional wearing medical scrubs or professional healthcare attire, looking accomplished and caring"),
    ("leraar", "Transform this person into a professional teacher wearing smart casual professional attire, with an inspiring and confident expression"),
    ("onderwijs", "Transform this person into a confident teacher or educator in professional attire, looking inspiring and knowledgeable"),
    ("informatica", "Transform this person into a professional software developer in modern business casual attire, looking innovative and skilled"),
    ("techniek", "Transform this person into a professional engineer or technician wearing appropriate work attire, looking skilled and confident"),
    ("business", "Transform this person into a professional business person wearing a modern suit or business attire, looking successful and confident"),
    ("economie", "Transform this person into a professional economist or business analyst in sophisticated business attire, looking accomplished and smart"),
    ("creativiteit", "Transform this person into a creative professional with artistic flair in their styling, looking inspired and accomplished"),
    ("design", "Transform this person into a professional designer wearing stylish creative attire, looking artistic and innovative"),
    ("sport", "Transform this person into a professional sports coach or fitness instructor wearing athletic professional attire, looking energetic and accomplished"),
    ("recht", "Transform this person into a legal professional in formal business attire, looking authoritative and trustworthy"),
    ("onderzoek", "Transform this person into a research professional in a laboratory setting, looking intellectual and curious"),
    ("maatschappij", "Transform this person into a social professional in professional attire, looking empathetic and engaged"),
];

const TRANSFORM_DEFAULT: &str = "Transform this person into a confident professional wearing appropriate business attire, looking successful and accomplished in their career";

/// Generation prompts: field-specific scene detail for a fresh portrait.
const PORTRAIT_DETAILS: &[(&str, &str)] = &[
    ("zorg", "Healthcare professional in a modern medical environment, confident and caring, professional medical attire, warm lighting"),
    ("onderwijs", "Educator in a bright classroom setting, inspiring and knowledgeable, professional teaching attire"),
    ("techniek", "Technology professional in a modern tech workspace, innovative and focused, smart casual attire"),
    ("business", "Business professional in a corporate environment, confident and successful, business attire, modern office"),
    ("creativiteit", "Creative professional in an artistic studio workspace, inspiring and artistic, stylish attire"),
    ("sport", "Sports professional in an athletic environment, energetic and healthy, athletic professional wear"),
    ("recht", "Legal professional in a law office, authoritative and trustworthy, formal business attire"),
    ("onderzoek", "Research professional in a laboratory or academic setting, intellectual and curious"),
    ("maatschappij", "Social professional in a community setting, empathetic and engaged"),
];

const PORTRAIT_DEFAULT: &str =
    "Professional in their chosen field, confident and successful, professional attire, modern workplace";

fn lookup<'a>(table: &[(&str, &'a str)], key: &str) -> Option<&'a str> {
    let key = key.to_lowercase();
    table
        .iter()
        .find(|&&(field, _)| key.contains(field))
        .map(|&(_, prompt)| prompt)
}

/// Photo-edit prompt for a career field, preferring the specific role.
pub fn transform_prompt(career_field: &str, specific_role: Option<&str>) -> String {
    let base = specific_role
        .and_then(|role| lookup(TRANSFORM_PROMPTS, role))
        .or_else(|| lookup(TRANSFORM_PROMPTS, career_field))
        .unwrap_or(TRANSFORM_DEFAULT);
    format!("{base}, high quality professional photography, natural lighting, realistic")
}

/// Fresh-portrait prompt for a career field, preferring the specific role.
pub fn portrait_prompt(career_field: &str, specific_role: Option<&str>) -> String {
    let subject = specific_role.filter(|r| !r.is_empty()).unwrap_or(career_field);
    let detail = lookup(PORTRAIT_DETAILS, career_field).unwrap_or(PORTRAIT_DEFAULT);
    format!(
        "Professional portrait of a successful {subject} specialist. {detail}, \
         high quality professional photography, natural lighting, realistic, detailed"
    )
}
