use crate::config::GenerationSettings;
use crate::services::quiz_pipeline::parser::expected_letters;

pub const QUIZ_SYSTEM_PROMPT: &str = "You write exam-style cybersecurity multiple-choice questions.
Output PLAIN TEXT ONLY.
ABSOLUTE RULES:
- Use exactly the format below.
- No extra lines, no commentary, no titles.
- Choices are SHORT LABELS (2-7 words), NOT sentences.
- Exactly ONE correct option.
- Explanation is ONE short sentence.
- Separate questions with a line containing only: ---

FORMAT (repeat for each question):
Q: <one SHORT sentence>
A) <short label>
B) <short label>
C) <short label>
D) <short label>
ANSWER: <A|B|C|D>
EXPLAIN: <one short sentence>
---

Now follow the same format.
";

pub const FORMAT_HINT: &str = "Follow the exact format.";

pub const QUALITY_HINT: &str =
    "Keep the question clear and specific. All options must be plausible and in the same technical context.";

pub const SINGLE_QUESTION_HINT: &str = "Output exactly ONE question only. Follow the exact format.";

/// Builds the user message for one completion request.
///
/// `avoid` is ordered oldest first; only the most recent
/// `settings.avoid_prompt_entries` non-empty entries are shown.
pub fn build_user_prompt(
    topic: &str,
    count: usize,
    settings: &GenerationSettings,
    avoid: &[String],
    hint: Option<&str>,
) -> String {
    let mut prompt = format!(
        "TOPIC: {topic}\n\n\
         Style: OffSec / exam-style.\n\
         Generate EXACTLY {count} question(s).\n\
         Choices per question: {choices}.\n\
         Limits: Q<={q_len} chars, EXPLAIN<={e_len} chars, CHOICE<={c_len} chars.\n\
         Rules:\n\
         - Exactly ONE correct option.\n\
         - Choices must be short labels (2-{words} words), not full sentences.\n\
         - Follow the exact output format from the system message.\n\n",
        choices = settings.expected_choices,
        q_len = settings.max_question_len,
        e_len = settings.max_explanation_len,
        c_len = settings.max_choice_len,
        words = settings.max_choice_words,
    );

    if settings.expected_choices != 4 {
        let letters: Vec<String> = expected_letters(settings.expected_choices)
            .iter()
            .map(char::to_string)
            .collect();
        prompt.push_str(&format!(
            "Use only the choice letters {} and ANSWER: <{}>.\n\n",
            letters.join(", "),
            letters.join("|")
        ));
    }

    let recent: Vec<&str> = avoid
        .iter()
        .map(String::as_str)
        .filter(|a| !a.trim().is_empty())
        .collect();
    let shown = &recent[recent.len().saturating_sub(settings.avoid_prompt_entries)..];
    if !shown.is_empty() {
        prompt.push_str("AVOID close paraphrases of these recent questions:\n- ");
        prompt.push_str(&shown.join("\n- "));
        prompt.push_str("\n\n");
    }

    if let Some(hint) = hint.filter(|h| !h.is_empty()) {
        prompt.push_str(&format!("EXTRA:\n{hint}\n\n"));
    }

    prompt.push_str("Return the questions now.");
    prompt
}
