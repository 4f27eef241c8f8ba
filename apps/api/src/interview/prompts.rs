// Prompt constants and builders for the interview orchestrator.
// Templates use `{placeholder}` markers filled with `str::replace`.

use crate::interview::templates::{role_description, Difficulty};

/// Interviewer persona. Replace: {role_description}, {difficulty_context}, {job_description}
pub const INTERVIEWER_SYSTEM_TEMPLATE: &str = "You are an experienced technical interviewer conducting a mock interview for a {role_description} position in India's IT industry.

{difficulty_context}

{job_description}

Interview Guidelines:
- Be professional, friendly, and encouraging
- Ask one question at a time
- Wait for the candidate's response before asking follow-up questions
- Provide brief feedback after each answer (what was good, what could be improved)
- Ask follow-up questions based on their answers to probe deeper
- Cover technical skills, problem-solving, and situational questions
- Keep responses concise but helpful
- Use Indian IT industry context when relevant (mention common companies, technologies used in India)";

/// Evaluator persona used for the final grading turn. Replace: {role_description}
pub const EVALUATION_SYSTEM_TEMPLATE: &str = r#"You are evaluating a mock interview for a {role_description} position. Analyze the conversation and provide:

1. An overall score from 0-100
2. Skill ratings as a JSON object with skills relevant to the role (each rated 0-100)
3. A brief feedback summary (2-3 paragraphs)
4. An improvement plan as an array of 3-5 actionable items

Respond ONLY with valid JSON in this exact format:
{
  "overallScore": <number>,
  "skillRatings": {"skill_name": <number>, ...},
  "summary": "<string>",
  "improvementPlan": ["<string>", ...]
}"#;

pub const START_INSTRUCTION: &str = "Start the interview with a warm greeting, briefly introduce yourself as the interviewer, and ask your first question. Keep it professional and encouraging.";

pub const RESPOND_INSTRUCTION: &str = "Continue the interview based on the candidate's response. Provide brief feedback on their answer, then either ask a follow-up question or move to a new topic. Keep the conversation flowing naturally.";

pub const END_INSTRUCTION: &str = "Evaluate this interview and provide the structured feedback.";

/// Builds the interviewer system prompt for the start and respond phases.
/// A blank job description leaves its paragraph empty.
pub fn interviewer_system_prompt(
    role_type: &str,
    difficulty: &str,
    job_description: Option<&str>,
) -> String {
    let job_paragraph = job_description
        .map(str::trim)
        .filter(|jd| !jd.is_empty())
        .map(|jd| format!("The candidate is applying for a role with this job description: {jd}"))
        .unwrap_or_default();

    // The job description is user text, so it is substituted last.
    INTERVIEWER_SYSTEM_TEMPLATE
        .replace("{role_description}", role_description(role_type))
        .replace("{difficulty_context}", Difficulty::resolve(difficulty).context())
        .replace("{job_description}", &job_paragraph)
}

pub fn evaluation_system_prompt(role_type: &str) -> String {
    EVALUATION_SYSTEM_TEMPLATE.replace("{role_description}", role_description(role_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::templates::RoleType;

    #[test]
    fn test_frontend_beginner_prompt_embeds_both_templates() {
        let prompt = interviewer_system_prompt("frontend", "beginner", None);
        assert!(prompt.contains(RoleType::Frontend.description()));
        assert!(prompt.contains(Difficulty::Beginner.context()));
        assert!(!prompt.contains("job description:"));
        assert!(!prompt.contains('{'), "unfilled placeholder in: {prompt}");
    }

    #[test]
    fn test_every_role_is_reflected_verbatim() {
        for role in RoleType::ALL {
            let prompt = interviewer_system_prompt(role.as_str(), "advanced", None);
            assert!(
                prompt.contains(&format!("for a {} position", role.description())),
                "role {role} missing from prompt"
            );
        }
    }

    #[test]
    fn test_unknown_role_and_difficulty_use_fallbacks() {
        let prompt = interviewer_system_prompt("wizard", "godlike", None);
        assert!(prompt.contains("mock interview for a Software Engineer position"));
        assert!(prompt.contains(Difficulty::Intermediate.context()));
    }

    #[test]
    fn test_job_description_is_included_when_present() {
        let prompt = interviewer_system_prompt(
            "backend",
            "advanced",
            Some("  Build payment APIs in Rust.  "),
        );
        assert!(prompt.contains(
            "The candidate is applying for a role with this job description: Build payment APIs in Rust."
        ));
    }

    #[test]
    fn test_blank_job_description_is_omitted() {
        let prompt = interviewer_system_prompt("backend", "advanced", Some("   "));
        assert!(!prompt.contains("job description:"));
    }

    #[test]
    fn test_job_description_placeholders_are_not_expanded() {
        let prompt = interviewer_system_prompt("data", "beginner", Some("{role_description}"));
        assert!(prompt.contains("job description: {role_description}"));
    }

    #[test]
    fn test_evaluation_prompt_demands_json_fields() {
        let prompt = evaluation_system_prompt("cloud");
        assert!(prompt.contains(RoleType::Cloud.description()));
        for field in ["overallScore", "skillRatings", "summary", "improvementPlan"] {
            assert!(prompt.contains(field), "missing {field}");
        }
    }
}
