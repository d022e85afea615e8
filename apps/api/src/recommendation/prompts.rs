// Recommendation prompt templates, one per plugin.
// Placeholders use `$field` syntax and are filled from the request body.
// The JSON structure each template asks for is the shape the plugin parses.

/// Work profile summary. Fields: target_role, name, role, my_company, description.
pub const WORK_PROFILE_TEMPLATE: &str = r#"
My target role: $target_role.
My name: $name
My current work is $role.
My company (if exists): $my_company
Description (if exists): $description

Give me at least 8 examples to showcase my own professional profile or you can rephrase description if exists, please make it concise by at max 2 paragraphs for each recommendation
and returns in JSON format with this structure: {"recommendations": ["item1", "item2"]}.
"#;

/// Work experience bullets. Fields: current_role, current_job_type, description.
pub const WORK_EXPERIENCE_TEMPLATE: &str = r#"
My current role: $current_role.
My job type: $current_job_type
Description (if exists): $description

Give me at least 8 examples of work experience achievements for my current role or you can rephrase description if exists, please make it concise by at max 2 sentences for each recommendation and highlight measurable impact
and returns in JSON format with this structure: {"recommendations": ["item1", "item2"]}.
"#;

/// Education section. Fields: current_major.
pub const EDUCATION_TEMPLATE: &str = r#"
My major: $current_major.

Give me at least 8 examples to describe my education in this major, covering relevant coursework, projects, and achievements, please make it concise by at max 3 sentences for each recommendation
and returns in JSON format with this structure: {"recommendations": ["item1", "item2"]}.
"#;

/// Skills grouped by category. Fields: current_role.
pub const SKILLS_TEMPLATE: &str = r#"
My current role: $current_role.

Give me the most relevant skills for my current role grouped by category (for example Technical Skills, Soft Skills, Tools), with at least 5 skills for each category, please keep each skill to a few words
and returns in JSON format with this structure: {"Technical Skills": ["skill1", "skill2"], "Soft Skills": ["skill1", "skill2"]}.
"#;
