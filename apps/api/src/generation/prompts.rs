// All LLM prompt constants for the Generation module.
// Placeholders are `{snake_case}` names filled by `fill_template`.

/// Token ceiling for resume drafts.
pub const RESUME_MAX_TOKENS: u32 = 1500;

/// Token ceiling for cover letters.
pub const COVER_LETTER_MAX_TOKENS: u32 = 800;

pub const RESUME_SYSTEM: &str = "You are an expert resume writer and career counselor. \
    Create professional, tailored resumes that highlight individual strengths.";

/// Resume prompt template.
/// Replace: {name}, {email}, {phone}, {target_role}, {skills}, {education}, {experience}, {projects}
pub const RESUME_PROMPT_TEMPLATE: &str = r#"Generate a professional, tailored resume content for the following student:

Name: {name}
Email: {email}
Phone: {phone}
Target Role: {target_role}

Skills: {skills}
Education: {education}
Experience: {experience}
Projects: {projects}

Create a compelling, well-structured resume that highlights the most relevant skills and experiences for the {target_role} position. Use professional language and format it with clear sections. Make it ATS-friendly and impactful.

Return the resume in the following JSON format:
{
    "summary": "Professional summary paragraph",
    "skills": ["skill1", "skill2", "skill3"],
    "experience": [
        {"title": "Job Title", "company": "Company Name", "duration": "Duration", "description": "What you did"}
    ],
    "education": [
        {"degree": "Degree", "institution": "School Name", "year": "Year", "details": "Details"}
    ],
    "projects": [
        {"name": "Project Name", "description": "What it does", "technologies": "Tech stack"}
    ]
}"#;

pub const COVER_LETTER_SYSTEM: &str =
    "You are an expert career counselor who writes compelling cover letters.";

/// Cover letter prompt template.
/// Replace: {name}, {target_role}, {company}, {skills}, {experience}
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"Write a compelling, professional cover letter for:

Applicant: {name}
Target Role: {target_role}
Company: {company}
Skills: {skills}
Experience: {experience}

Create a personalized cover letter that showcases enthusiasm, relevant skills, and fit for the role. Keep it concise (3-4 paragraphs) and professional."#;

/// Cover letter used when no provider credential is configured.
/// Replace: {name}, {target_role}, {company}, {skills}, {experience}
pub const FALLBACK_COVER_LETTER_TEMPLATE: &str = r#"Dear Hiring Manager,

I am writing to express my strong interest in the {target_role} position at {company}. As a motivated student with skills in {skills}, I am excited about the opportunity to contribute to your team.

{experience}

I am confident that my technical skills, combined with my passion for learning and problem-solving, make me a strong candidate for this position. I look forward to the opportunity to discuss how I can contribute to {company}'s success.

Thank you for your consideration.

Sincerely,
{name}"#;

/// Substitutes `{key}` placeholders in a single left-to-right pass.
///
/// Substituted values are never rescanned, so user text that happens to contain
/// `{name}` is emitted verbatim. Braces that do not name a known key (the JSON
/// schema in the resume prompt) are left alone.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let candidate = &rest[open..];

        let matched = values.iter().find(|(key, _)| {
            candidate
                .strip_prefix('{')
                .and_then(|s| s.strip_prefix(key))
                .is_some_and(|s| s.starts_with('}'))
        });

        match matched {
            Some((key, value)) => {
                out.push_str(value);
                rest = &candidate[key.len() + 2..];
            }
            None => {
                out.push('{');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_template_replaces_every_occurrence() {
        let out = fill_template("{a} and {a} then {b}", &[("a", "x"), ("b", "y")]);
        assert_eq!(out, "x and x then y");
    }

    #[test]
    fn test_fill_template_does_not_rescan_values() {
        let out = fill_template("Hi {name}, role {role}", &[("name", "{role}"), ("role", "SRE")]);
        assert_eq!(out, "Hi {role}, role SRE");
    }

    #[test]
    fn test_fill_template_keeps_unknown_braces() {
        let out = fill_template(r#"{"summary": "{x}"} {"#, &[("x", "ok")]);
        assert_eq!(out, r#"{"summary": "ok"} {"#);
    }

    #[test]
    fn test_resume_template_keeps_json_schema_intact() {
        let out = fill_template(RESUME_PROMPT_TEMPLATE, &[("target_role", "SRE")]);
        assert!(out.contains(r#""skills": ["skill1", "skill2", "skill3"]"#));
        assert!(out.contains("for the SRE position"));
    }
}
