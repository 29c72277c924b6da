use std::sync::Arc;

use async_trait::async_trait;
use discord_types::{Embed, ReplyPayload};
use tracing::info;

use super::questions::{NewQuestion, QuestionStore};
use crate::context::CommandContext;
use crate::registry::CommandHandler;

const MIN_OPTIONS: usize = 2;
const MAX_OPTIONS: usize = 10;
const COLOR_OK: u32 = 0x57F287;

/// `/addquestion question:<text> options:<a, b, c> correct:<b> [difficulty:<text>]`
pub struct AddQuestion {
    store: Arc<dyn QuestionStore>,
}

impl AddQuestion {
    pub fn new(store: Arc<dyn QuestionStore>) -> Self {
        Self { store }
    }
}

/// Validated answer set. `correct` is spelled as in `options`.
#[derive(Debug, PartialEq)]
struct AnswerSet {
    options: Vec<String>,
    correct: String,
}

/// Comma-separated options, trimmed, blanks dropped. The correct answer must
/// be one of them (case-insensitive).
fn parse_answers(options: &str, correct: &str) -> Result<AnswerSet, String> {
    let options: Vec<String> = options
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect();

    if options.len() < MIN_OPTIONS {
        return Err(format!("Give at least {MIN_OPTIONS} comma-separated options."));
    }
    if options.len() > MAX_OPTIONS {
        return Err(format!("At most {MAX_OPTIONS} options are allowed."));
    }
    for (i, option) in options.iter().enumerate() {
        if options[..i].iter().any(|o| o.eq_ignore_ascii_case(option)) {
            return Err(format!("Option `{option}` is listed twice."));
        }
    }

    let correct = correct.trim();
    match options.iter().find(|o| o.eq_ignore_ascii_case(correct)) {
        Some(matched) => Ok(AnswerSet {
            correct: matched.clone(),
            options,
        }),
        None => Err(format!("The correct answer `{correct}` is not one of the options.")),
    }
}

#[async_trait]
impl CommandHandler for AddQuestion {
    fn name(&self) -> &'static str {
        "addquestion"
    }

    async fn execute(&self, ctx: &mut CommandContext) -> anyhow::Result<()> {
        let text = ctx.option_str("question")?.trim().to_string();
        let answers = match parse_answers(ctx.option_str("options")?, ctx.option_str("correct")?) {
            Ok(answers) => answers,
            Err(problem) => {
                ctx.respond(&ReplyPayload::text(problem).ephemeral(true)).await;
                return Ok(());
            }
        };
        let difficulty = ctx
            .option_str("difficulty")
            .ok()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        let question = NewQuestion {
            guild_id: ctx.guild_id().map(str::to_string),
            author_id: ctx.user_id().to_string(),
            text: text.clone(),
            options: answers.options.clone(),
            correct: answers.correct.clone(),
            difficulty: difficulty.clone(),
        };
        let id = self.store.add(question).await?;
        info!(question_id = %id, "Question added");

        let listed = answers
            .options
            .iter()
            .map(|o| format!("• {o}"))
            .collect::<Vec<_>>()
            .join("\n");
        let mut embed = Embed::new()
            .title("Question added")
            .description(text)
            .field("Options", listed, false)
            .field("Correct answer", answers.correct, true);
        if let Some(difficulty) = difficulty {
            embed = embed.field("Difficulty", difficulty, true);
        }
        let embed = embed.color(COLOR_OK).footer(format!("id {id}"));
        ctx.respond(&ReplyPayload::embed(embed)).await;
        Ok(())
    }
}
