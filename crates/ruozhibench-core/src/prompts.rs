//! Prompt templates and the per-mode formatters that render them.
//!
//! Templates are module-level constants: immutable configuration data, filled
//! with named `{field}` placeholders drawn from a record. A missing field is a
//! fatal per-run error — drivers validate required columns before dispatch.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::errors::Error;
use crate::model::{ChatMessage, Record};

/// System role used when collecting responses from the model under test.
pub const ASSISTANT_SYSTEM_ROLE: &str = "You are a helpful assistant.";

/// System prompt for rubric scoring of answers to deceptive questions.
pub const GEN_EVAL_SYSTEM_PROMPT: &str = "\
You are an evaluation system designed to assess responses to *deceptive* or *logically flawed* questions.

## Task Definition:
For each input, you will be provided with:
- A **deceptive question** that contains misleading premises, logical fallacies, or contradictions.
- An **irrationality analysis**, explaining why the question is deceptive and identifying its logical flaws.
- An **answer** provided by a model or a human.

Your task is to **evaluate the answer's ability to correctly identify and address the deception** rather than simply providing a direct response.

## Rating Criteria (0-4 Scale):
- **0**: The answer completely fails to recognize the deception and directly attempts to answer the question as if it were valid.
- **1**: The answer acknowledges a flaw but does not engage with it meaningfully.
- **2**: The answer recognizes and partially explains the deception but has logical gaps.
- **3**: The answer correctly identifies and mostly explains the fallacy but lacks depth or clarity.
- **4**: The answer fully explains the deceptive nature, providing a comprehensive and logically sound explanation.

## Output Format:
You must return a JSON object with keys: \"rating\" (int) and \"explanation\" (str), for example:
{
\"rating\": [0, 1, 2, 3, or 4],
\"explanation\": \"[Your justification for the rating]\"
}
Ensure that your response is **valid JSON** with the exact keys shown above without any additional text or formatting.
";

/// User prompt for rubric scoring of answers to deceptive questions.
pub const GEN_EVAL_USER_PROMPT: &str = "\
<question>
{question}
</question>

<irrationality_analysis>
{irrationality_analysis}
</irrationality_analysis>

<answer>
{answer}
</answer>


You must return a JSON object with keys: \"rating\" (int) and \"explanation\" (str), for example:
{
\"rating\": [2],
\"explanation\": \"[Your justification for the rating]\"
}
Ensure that your response is **valid JSON** with the exact keys shown above without any additional text or formatting.
";

/// User prompt for the pairwise forced-choice comparison.
pub const MC_EVAL_USER_PROMPT: &str = "\
You are an expert in logical reasoning. Focus only on the content and logic when evaluating answers, ignoring format, style, or wording differences.

Question: {question}

<answers>
    <answerA>
        {answer1}
    </answerA>
    <answerB>
        {answer2}
    </answerB>
</answers>

Feel free to analyze first andchoose one answer based solely on its content and logic.
At the end of your response, please provide your choice in a separate line in the following format:

<choice>AnswerA or AnswerB</choice>
";

/// User prompt for rubric scoring of answers to ordinary questions.
pub const NORMAL_EVAL_USER_PROMPT: &str = "\
You are an expert evaluator tasked with assessing the quality of an answer to a given question.

## Question:
{question}

## Answer:
{answer}

## Evaluation Criteria:
Rate the answer based on the following criteria:
- 4: Excellent – The answer is complete, accurate, and well-explained.
- 3: Good – The answer is mostly correct with minor inaccuracies or missing details.
- 2: Fair – The answer has some correct elements but contains notable errors or omissions.
- 1: Poor – The answer is mostly incorrect or incomplete.
- 0: Very Poor – The answer is irrelevant or completely incorrect.

## Output Format:
You must return a JSON object with keys: \"rating\" (int) and \"explanation\" (str), for example:
{
\"rating\": [0, 1, 2, 3, or 4],
\"explanation\": \"[Your justification for the rating]\"
}
Ensure that your response is **valid JSON** with the exact keys shown above without any additional text or formatting.
";

lazy_static! {
    static ref PLACEHOLDER_RE: Regex = Regex::new(r"\{([a-z0-9_]+)\}").unwrap();
}

/// Fill `{name}` placeholders in a single pass. Unknown placeholders (and the
/// literal JSON braces in the templates) are left untouched; substituted
/// values are never re-scanned.
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures<'_>| {
            let name = &caps[1];
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| (*v).to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// System+user message pair for gen-mode rubric scoring.
/// Requires `question_en`, `irrationality`, and `response`.
pub fn gen_eval_messages(record: &Record) -> Result<Vec<ChatMessage>, Error> {
    let question = record.text_field("question_en")?;
    let analysis = record.text_field("irrationality")?;
    let answer = record.text_field("response")?;
    let user = render(
        GEN_EVAL_USER_PROMPT,
        &[
            ("question", question.as_ref()),
            ("irrationality_analysis", analysis.as_ref()),
            ("answer", answer.as_ref()),
        ],
    );
    Ok(vec![
        ChatMessage::system(GEN_EVAL_SYSTEM_PROMPT),
        ChatMessage::user(user),
    ])
}

/// Single user message for normal-mode rubric scoring.
/// Requires `pair` and `pair_response`.
pub fn normal_eval_messages(record: &Record) -> Result<Vec<ChatMessage>, Error> {
    let question = record.text_field("pair")?;
    let answer = record.text_field("pair_response")?;
    let user = render(
        NORMAL_EVAL_USER_PROMPT,
        &[("question", question.as_ref()), ("answer", answer.as_ref())],
    );
    Ok(vec![ChatMessage::user(user)])
}

/// Pairwise prompt text. Each record is rendered twice, once per answer
/// order, to cancel positional bias.
pub fn mc_eval_prompt(question: &str, answer_a: &str, answer_b: &str) -> String {
    render(
        MC_EVAL_USER_PROMPT,
        &[
            ("question", question),
            ("answer1", answer_a),
            ("answer2", answer_b),
        ],
    )
}

/// Precondition check run by drivers before any dispatch: every record must
/// carry every required column, non-null.
pub fn require_columns(records: &[Record], columns: &[&str]) -> Result<(), Error> {
    for col in columns {
        if records.iter().any(|r| !r.has(col)) {
            return Err(Error::missing_column(*col));
        }
    }
    Ok(())
}
