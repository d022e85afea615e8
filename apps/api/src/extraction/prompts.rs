// Résumé extraction prompts. The output schema here must stay in sync
// with `ResumeRecord`.

pub const RESUME_EXTRACT_SYSTEM: &str = "\
You are a precise resume data extractor. \
Read the resume text and return the requested fields as a single JSON object. \
Use null for fields that are not present and empty arrays for empty lists. \
Do NOT invent details that are not in the resume.";

/// Replace `{resume_text}` before sending.
pub const RESUME_EXTRACT_PROMPT: &str = r#"Extract the following information from the resume below.

OUTPUT SCHEMA (return exactly this structure):
{
  "name": "string" | null,
  "email": "string" | null,
  "contact_number": "string" | null,
  "skills": ["string"],
  "educations": [
    {"institution": "string", "degree": "string" | null, "start_date": "string" | null, "end_date": "string" | null, "location": "string" | null}
  ],
  "work_experiences": [
    {"company": "string", "role": "string" | null, "start_date": "string" | null, "end_date": "string" | null, "location": "string" | null}
  ],
  "years_of_experience": number | null
}

RULES:
1. Dates keep the wording used in the resume ("Jan 2020", "2019", "Present").
2. years_of_experience is the total across work_experiences, rounded to one decimal.
3. Return ONLY the JSON object.

RESUME:
{resume_text}"#;
