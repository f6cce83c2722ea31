//! Deterministic documents produced when no provider credential is configured.

use crate::generation::prompts::{fill_template, FALLBACK_COVER_LETTER_TEMPLATE};
use crate::models::resume::{
    CoverLetterRequest, EducationItem, ExperienceItem, ProjectItem, ResumeDocument, ResumeRequest,
};

/// Splits a comma-delimited skills string and trims each piece.
///
/// Empty pieces are kept so the result lines up one-to-one with the input commas.
pub fn split_skills(skills: &str) -> Vec<String> {
    skills.split(',').map(|s| s.trim().to_string()).collect()
}

pub fn fallback_resume(request: &ResumeRequest) -> ResumeDocument {
    ResumeDocument {
        summary: format!(
            "Motivated student with strong background in {}. Seeking {} position to apply \
             technical skills and contribute to innovative projects.",
            request.skills, request.target_role
        ),
        skills: split_skills(&request.skills),
        experience: vec![ExperienceItem {
            title: "Various Roles".to_string(),
            company: "Experience".to_string(),
            duration: "Recent".to_string(),
            description: request.experience.clone(),
        }],
        education: vec![EducationItem {
            degree: request.education.clone(),
            institution: "Educational Institution".to_string(),
            year: "Recent".to_string(),
            details: String::new(),
        }],
        projects: vec![ProjectItem {
            name: "Projects".to_string(),
            description: request.projects.clone(),
            technologies: request.skills.clone(),
        }],
    }
}

pub fn fallback_cover_letter(request: &CoverLetterRequest) -> String {
    fill_template(
        FALLBACK_COVER_LETTER_TEMPLATE,
        &[
            ("name", request.name.as_str()),
            ("target_role", request.target_role.as_str()),
            ("company", request.company.as_str()),
            ("skills", request.skills.as_str()),
            ("experience", request.experience.as_str()),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> ResumeRequest {
        ResumeRequest {
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            phone: "+1234567890".to_string(),
            skills: "Python,  JavaScript , Rust".to_string(),
            education: "B.Tech CS".to_string(),
            experience: "Intern at Tech Corp".to_string(),
            projects: "Built web apps".to_string(),
            target_role: "Software Engineer".to_string(),
        }
    }

    #[test]
    fn test_fallback_skills_are_comma_split_and_trimmed() {
        let request = sample_request();
        let doc = fallback_resume(&request);
        let expected: Vec<String> = request
            .skills
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();
        assert_eq!(doc.skills, expected);
        assert_eq!(doc.skills, vec!["Python", "JavaScript", "Rust"]);
    }

    #[test]
    fn test_fallback_echoes_inputs() {
        let doc = fallback_resume(&sample_request());
        assert!(doc.summary.contains("Software Engineer"));
        assert_eq!(doc.experience[0].description, "Intern at Tech Corp");
        assert_eq!(doc.education[0].degree, "B.Tech CS");
        assert_eq!(doc.projects[0].description, "Built web apps");
        assert_eq!(doc.projects[0].technologies, "Python,  JavaScript , Rust");
    }

    #[test]
    fn test_fallback_with_empty_request_is_still_a_document() {
        let doc = fallback_resume(&ResumeRequest::default());
        assert_eq!(doc.skills, vec![String::new()]);
        assert_eq!(doc.experience.len(), 1);
    }

    #[test]
    fn test_fallback_cover_letter_substitutes_fields() {
        let letter = fallback_cover_letter(&CoverLetterRequest {
            name: "Ada".to_string(),
            target_role: "Developer".to_string(),
            company: "Tech Corp".to_string(),
            skills: "Python".to_string(),
            experience: "Built several projects".to_string(),
        });
        assert!(letter.starts_with("Dear Hiring Manager,"));
        assert!(letter.contains("the Developer position at Tech Corp"));
        assert!(letter.contains("Tech Corp's success"));
        assert!(letter.contains("\n\nBuilt several projects\n\n"));
        assert!(letter.ends_with("Sincerely,\nAda"));
    }
}
