//! Dice Bot Demo
//!
//! Declares a few commands with typed options, starts a [`CommandRuntime`]
//! against an in-memory client, and feeds it synthetic interactions:
//!
//! ```text
//! /roll die:<D4|D6|D8|D12|D20> [count:1-10] [label:<auto-complete>]
//! /coin
//! [user menu] Challenge to a duel
//! ```
//!
//! The client prints everything the framework sends back instead of talking
//! to a remote API.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package dice-bot
//! ```

use std::sync::Arc;

use anvil::core::{
    ApiResult, AutoCompleteEvent, CommandData, CommandScope, FocusedOption, InteractionInfo,
    OptionMapping, OptionType, SlashCommandEvent, Snowflake, UserContextEvent,
};
use anvil::prelude::*;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

// ============================================================================
// Commands
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, CommandChoice)]
#[choice(crate = "anvil::core")]
enum Die {
    D4,
    D6,
    D8,
    D12,
    #[choice(name = "D20 (icosahedron)")]
    D20,
}

impl Die {
    fn sides(self) -> u64 {
        match self {
            Self::D4 => 4,
            Self::D6 => 6,
            Self::D8 => 8,
            Self::D12 => 12,
            Self::D20 => 20,
        }
    }
}

const LABELS: [&str; 5] = ["attack", "damage", "initiative", "perception", "stealth"];

/// Deterministic rolls seeded by the interaction id, so the demo output is
/// reproducible.
fn roll(seed: u64, sides: u64, count: i64) -> Vec<u64> {
    let mut state = seed;
    (0..count)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 33) % sides + 1
        })
        .collect()
}

fn declare(registry: &mut CommandRegistry) {
    registry.slash("roll", "Roll some dice", |cmd| {
        let die = cmd.option(choice_option::<Die>("die", "Which die to roll"));
        let count = cmd.option(integer("count", "How many dice").range(1, 10).optional());
        let label = cmd.option(
            string("label", "What the roll is for")
                .max_length(32)
                .auto_complete(|ctx| {
                    let input = ctx.input().to_lowercase();
                    LABELS
                        .iter()
                        .filter(|label| label.starts_with(&input))
                        .map(|label| (label.to_string(), label.to_string()))
                        .collect::<Vec<_>>()
                })
                .optional(),
        );

        cmd.handler(move |ctx| {
            let die = ctx.value(&die);
            let count = ctx.value(&count);
            let label = ctx.value(&label);
            async move {
                let die = die?;
                let count = count?.unwrap_or(1);
                let rolls = roll(ctx.event().info.id.get(), die.sides(), count);
                let total: u64 = rolls.iter().sum();

                let mut text = format!(
                    "{} rolled {count}{die:?}: {rolls:?} = {total}",
                    ctx.user().display_name()
                );
                if let Some(label) = label? {
                    text.push_str(&format!(" ({label})"));
                }
                ctx.reply(&text).await?;
                anyhow::Ok(())
            }
        });
    });

    registry.slash("coin", "Flip a coin", |cmd| {
        cmd.handler(|ctx| async move {
            let side = if ctx.event().info.id.get() % 2 == 0 {
                "heads"
            } else {
                "tails"
            };
            ctx.reply(side).await
        });
    });

    registry
        .user("Challenge to a duel", |ctx: UserCommandContext| async move {
            let challenger = ctx.event().info.user.display_name().to_string();
            let target = ctx.target().display_name().to_string();
            ctx.reply(&format!("{challenger} challenges {target} to a d20 duel!"))
                .await
        })
        .guild_only();
}

// ============================================================================
// In-memory client
// ============================================================================

/// Prints what the framework sends instead of calling a remote API.
struct ConsoleClient;

#[async_trait]
impl Client for ConsoleClient {
    fn application_id(&self) -> Snowflake {
        Snowflake(1)
    }

    async fn replace_commands(
        &self,
        scope: &CommandScope,
        commands: &[CommandData],
    ) -> ApiResult<()> {
        info!(scope = %scope, count = commands.len(), "Replacing registered commands");
        println!("{}", serde_json::to_string_pretty(commands)?);
        Ok(())
    }

    async fn reply(&self, interaction: &InteractionInfo, content: &str) -> ApiResult<()> {
        println!("[reply to {}] {content}", interaction.id);
        Ok(())
    }

    async fn reply_choices(
        &self,
        interaction: &InteractionInfo,
        choices: &[Choice],
    ) -> ApiResult<()> {
        let labels: Vec<_> = choices.iter().map(|c| c.name.as_str()).collect();
        println!("[suggestions for {}] {labels:?}", interaction.id);
        Ok(())
    }
}

// ============================================================================
// Synthetic interactions
// ============================================================================

fn info(id: u64) -> InteractionInfo {
    InteractionInfo {
        id: Snowflake(id),
        application_id: Snowflake(1),
        token: format!("token-{id}"),
        guild_id: Some(Snowflake(100)),
        user: User {
            id: Snowflake(7),
            username: "ada".into(),
            global_name: Some("Ada".into()),
            bot: false,
        },
        ..Default::default()
    }
}

fn events() -> Vec<InteractionEvent> {
    vec![
        SlashCommandEvent::new(info(1001), "roll")
            .with_option(OptionMapping::new("die", OptionType::String, json!("D20")))
            .with_option(OptionMapping::new("count", OptionType::Integer, json!(3)))
            .with_option(OptionMapping::new("label", OptionType::String, json!("attack")))
            .into(),
        SlashCommandEvent::new(info(1002), "roll")
            .with_option(OptionMapping::new("die", OptionType::String, json!("\"D6\"")))
            .into(),
        AutoCompleteEvent::new(
            info(1003),
            "roll",
            FocusedOption {
                name: "label".into(),
                kind: OptionType::String,
                value: "p".into(),
            },
        )
        .into(),
        SlashCommandEvent::new(info(1004), "coin").into(),
        UserContextEvent {
            info: info(1005),
            name: "Challenge to a duel".into(),
            target: User {
                id: Snowflake(8),
                username: "grace".into(),
                ..Default::default()
            },
        }
        .into(),
        // Fails to decode and is reported through the failure hook.
        SlashCommandEvent::new(info(1006), "roll")
            .with_option(OptionMapping::new("die", OptionType::String, json!("D3")))
            .into(),
        // Not registered: dropped.
        SlashCommandEvent::new(info(1007), "help").into(),
    ]
}

#[tokio::main]
async fn main() -> Result<()> {
    let runtime = CommandRuntime::builder().build()?;
    runtime.on_failure(|report| {
        warn!(
            route = %report.route,
            panicked = report.panicked,
            "Command failed: {}",
            report.error
        );
    });
    runtime.register(declare)?;

    let client: BoxedClient = Arc::new(ConsoleClient);
    runtime.start(client.clone()).await?;

    for event in events() {
        let kind = event.kind_name();
        if !runtime.dispatch(event, client.clone()) {
            info!(kind, "No handler for interaction");
        }
    }

    runtime.shutdown().await;
    Ok(())
}
