//! Prompts sent to the models and marker strings inlined into stage output.
//!
//! Centralising every user-visible string here keeps wording changes in one
//! place and lets unit tests inspect prompts without calling a model.

use crate::config::MarkerLocale;
use crate::pipeline::transform::Stage;
use crate::service::SummaryBounds;

/// Build the system prompt for summarizing one chunk.
///
/// The chunk boundaries are arbitrary character windows, so the model is told
/// to expect text that starts or ends mid-sentence.
pub fn summary_system_prompt(bounds: SummaryBounds) -> String {
    format!(
        "You are a lecture summarizer. Summarize the text supplied by the user.\n\
         \n\
         Rules:\n\
         - The text is an excerpt and may start or end mid-sentence; summarize what is there.\n\
         - Write the summary in the same language as the text.\n\
         - Aim for at least {min} and at most {max} tokens.\n\
         - Output ONLY the summary, without headings, preamble or commentary.",
        min = bounds.min_length,
        max = bounds.max_length,
    )
}

/// Build the quiz-generation prompt for one chunk of the source text.
pub fn quiz_prompt(question_count: usize, chunk: &str) -> String {
    format!("Generate {question_count} multiple choice questions from this text:\n{chunk}")
}

/// Marker returned instead of a summary or quiz when extraction produced no text.
pub fn no_text_marker(locale: MarkerLocale) -> &'static str {
    match locale {
        MarkerLocale::English => "❌ No text could be extracted from the PDF",
        MarkerLocale::Arabic => "❌ لم يتم استخراج أي نص من الـ PDF",
    }
}

/// Marker substituted for one failed chunk: `❌ error during <stage>: <detail>`.
pub fn error_marker(locale: MarkerLocale, stage: Stage, detail: &str) -> String {
    match locale {
        MarkerLocale::English => format!("❌ error during {}: {}", stage.label(), detail),
        MarkerLocale::Arabic => {
            let label = match stage {
                Stage::Summarization => "التلخيص",
                Stage::QuizGeneration => "توليد Quiz",
                Stage::SpeechSynthesis => "توليد الصوت",
            };
            format!("❌ خطأ أثناء {}: {}", label, detail)
        }
    }
}
