pub mod specialist;

use anyhow::{Context, Result};
use log::{info, warn};
use serde::Deserialize;
use wello_shared::Role;

use crate::llm::{Generator, Message};
use crate::memory::StoredMessage;
use specialist::Specialist;

/// Upper bound on supervisor rounds before a run is abandoned.
const MAX_ROUNDS: usize = 8;

const SUPERVISOR_PROMPT: &str = "You are a supervisor managing a team of agents. \
Your goal is to orchestrate a workflow that answers the user's question.\n\n\
Your team:\n\
- researcher: looks up facts, current information, and general knowledge.\n\
- coder: handles calculations, algorithms, and technical problem-solving.\n\n\
Pick the single agent best suited for the next step, or FINISH when the work \
done so far already contains a satisfactory answer. If an agent has just \
failed at the question, consider whether the other agent fits better instead \
of repeating the same attempt.\n\n\
Respond with a JSON object of the form \
{\"next\": \"researcher\" | \"coder\" | \"FINISH\", \"reason\": \"one sentence\"}.";

const VALIDATOR_PROMPT: &str = "You are a quality control agent. You will be \
given a user's question and an agent's answer. Decide whether the answer \
addresses the main intent of the question. A good-enough answer passes; an \
off-topic, hallucinated, or evasive answer does not.\n\n\
Respond with a JSON object of the form \
{\"next\": \"FINISH\" | \"supervisor\", \"reason\": \"one sentence\"}, where \
FINISH accepts the answer and supervisor sends the work back for another \
attempt.";

/// One decision from the supervisor or the validator.
#[derive(Debug, Deserialize)]
struct Decision {
    next: String,
    #[serde(default)]
    reason: String,
}

/// One contribution to a run's working record.
#[derive(Debug)]
struct AgentTurn {
    speaker: &'static str,
    content: String,
}

/// Routes a question through the supervisor, a specialist, and the validator
/// until the validator accepts an answer.
pub struct AgentGraph {
    generator: Generator,
}

impl AgentGraph {
    pub fn new(generator: Generator) -> Self {
        Self { generator }
    }

    /// Run the full loop for one request. `history` already ends with the
    /// latest user message. Returns the accepted answer, or `None` when the
    /// run ended before any specialist produced one.
    pub async fn run(&self, history: &[StoredMessage]) -> Result<Option<String>> {
        let question = latest_question(history);
        let mut turns: Vec<AgentTurn> = Vec::new();

        for _ in 0..MAX_ROUNDS {
            let decision = self
                .decide(&supervisor_messages(question, &turns))
                .await
                .context("Supervisor decision failed")?;
            let route = decision.next.trim().to_string();
            turns.push(AgentTurn {
                speaker: "supervisor",
                content: decision.reason,
            });

            if route == "FINISH" {
                info!("Supervisor ended the run");
                return Ok(final_answer(&turns));
            }

            let specialist = match Specialist::from_str(&route) {
                Some(specialist) => specialist,
                None => {
                    warn!("Unknown route {:?}, sending the question to the researcher", route);
                    Specialist::Researcher
                }
            };
            info!("Supervisor routed to the {}", specialist.name());

            let answer = self
                .generator
                .complete(&specialist_messages(specialist, history, &turns))
                .await?;
            turns.push(AgentTurn {
                speaker: specialist.name(),
                content: answer.clone(),
            });

            let verdict = self
                .decide(&validator_messages(question, &answer))
                .await
                .context("Validator decision failed")?;
            let accepted = verdict.next.trim() == "FINISH";
            turns.push(AgentTurn {
                speaker: "validator",
                content: verdict.reason,
            });

            if accepted {
                info!("Validator accepted the answer");
                return Ok(final_answer(&turns));
            }
            info!("Validator sent the answer back to the supervisor");
        }

        anyhow::bail!("Run did not settle within {} rounds", MAX_ROUNDS)
    }

    async fn decide(&self, messages: &[Message]) -> Result<Decision> {
        let raw = self.generator.complete_structured(messages).await?;
        serde_json::from_str(raw.trim())
            .with_context(|| format!("Decision was not valid JSON: {}", raw))
    }
}

/// The latest specialist answer, ignoring supervisor and validator
/// commentary. `None` when no specialist spoke.
fn final_answer(turns: &[AgentTurn]) -> Option<String> {
    turns
        .iter()
        .rev()
        .find(|turn| Specialist::from_str(turn.speaker).is_some())
        .map(|turn| turn.content.clone())
}

fn latest_question(history: &[StoredMessage]) -> &str {
    history
        .iter()
        .rev()
        .find(|msg| msg.role == Role::User)
        .map(|msg| msg.content.as_str())
        .unwrap_or_default()
}

fn scratchpad(turns: &[AgentTurn]) -> String {
    turns
        .iter()
        .map(|turn| format!("{}: {}", turn.speaker, turn.content))
        .collect::<Vec<_>>()
        .join("\n")
}

fn supervisor_messages(question: &str, turns: &[AgentTurn]) -> Vec<Message> {
    let prompt = if turns.is_empty() {
        question.to_string()
    } else {
        format!(
            "The user's question is: '{}'\n\n\
             The following work has been done so far:\n{}\n\n\
             Based on this, what is the next best step?",
            question,
            scratchpad(turns)
        )
    };

    vec![
        Message::new("system", SUPERVISOR_PROMPT),
        Message::new("user", prompt),
    ]
}

/// System prompt first, then the thread's turns, then this run's working
/// record when there is one.
fn specialist_messages(
    specialist: Specialist,
    history: &[StoredMessage],
    turns: &[AgentTurn],
) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::new("system", specialist.system_prompt()));
    for msg in history {
        messages.push(Message::new(msg.role.as_str(), msg.content.clone()));
    }
    if !turns.is_empty() {
        messages.push(Message::new(
            "user",
            format!("Work done so far on this question:\n{}", scratchpad(turns)),
        ));
    }
    messages
}

fn validator_messages(question: &str, answer: &str) -> Vec<Message> {
    vec![
        Message::new("system", VALIDATOR_PROMPT),
        Message::new("user", format!("The original question was: '{}'", question)),
        Message::new(
            "assistant",
            format!("The agent provided this answer: '{}'", answer),
        ),
    ]
}
