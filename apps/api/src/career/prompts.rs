// Prompts for career pattern analysis. Placeholders in {braces} are filled with `.replace`.

pub const PATTERN_ANALYZER_SYSTEM: &str = r#"You are a career strategist who reads a candidate's interview and application history and finds the patterns behind their results.

Return a JSON object:
{
  "summary": "string",            // 2-3 sentences on where the search stands
  "patterns": ["string"],         // recurring trends across interviews and applications
  "strengths": ["string"],
  "weaknesses": ["string"],
  "rootCauses": ["string"],       // why the weaknesses happen, not just what they are
  "recommendations": ["string"],  // concrete and specific to this candidate
  "actionPlan": {
    "thisMonth": ["string"],
    "nextMonth": ["string"]
  }
}

Base every point on the data provided. If the history is thin, say so and recommend how to gather more signal."#;

pub const PATTERN_ANALYZER_PROMPT: &str = r#"Analyze the following career data and provide pattern insights:

Interview History: {interview_history}

Application History: {application_history}

User Profile:
- Skills: {skills}
- Target Roles: {target_roles}
- Experience: {experience}

Provide detailed analysis with patterns, root causes, and actionable recommendations.
Remember: Return ONLY valid JSON, no markdown formatting."#;
