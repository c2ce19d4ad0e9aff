//! Chat command handler

use crate::error::CliError;
use crate::render;
use lingua::{DialogueMode, LinguaApp, LinguaConfig, LinguaError, NextAction, UserId};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, info};

const PROMPT: &str = "📝 > ";

/// Interactive learning session for one learner
pub async fn run_chat(
    config: &LinguaConfig,
    user: &str,
    name: Option<String>,
    grade: Option<u8>,
) -> Result<(), CliError> {
    let app = LinguaApp::from_config("lingua-chat", config).await?;
    let user_id = UserId::from_string(user);
    let mut rl = DefaultEditor::new()?;

    println!("🎓 Lingua - type /help for commands, 'exit' to quit");
    println!("================================");

    debug!(user_id = %user_id, modules = app.metadata().module_count, "Chat session starting");

    let mut current = match app.dispatcher().start_session(&user_id).await {
        Ok(action) => action,
        Err(e) if e.is_not_found() => match onboard(&app, &mut rl, &user_id, name, grade).await? {
            Some(action) => action,
            None => return Ok(()),
        },
        Err(e) => return Err(e.into()),
    };
    println!("\n{}", render::action(&current));

    loop {
        let line = match read(&mut rl)? {
            Some(line) => line,
            None => break,
        };
        let input = line.trim();

        if input == "exit" || input == "quit" {
            break;
        }
        if !input.is_empty() {
            rl.add_history_entry(input).ok();
        }

        if let Some(command) = input.strip_prefix('/') {
            let (cmd, rest) = command.split_once(' ').unwrap_or((command, ""));
            match cmd {
                "help" => println!("{}", render::HELP),
                "progress" => match app.dispatcher().progress(&user_id).await {
                    Ok(report) => println!("{}", render::progress(&report)),
                    Err(e) => recover(e)?,
                },
                "review" => match app.dispatcher().start_review(&user_id).await {
                    Ok(action) => {
                        current = action;
                        println!("\n{}", render::action(&current));
                    }
                    Err(e) => recover(e)?,
                },
                "practice" => practice(&app, &user_id, rest, DialogueMode::Conversation).await,
                "correct" => practice(&app, &user_id, rest, DialogueMode::Correction).await,
                other => println!("Unknown command /{}. Type /help.", other),
            }
            continue;
        }

        let result = match &current {
            NextAction::ShowModuleSummary(_) | NextAction::ShowLevelComplete(_) => {
                app.dispatcher().start_session(&user_id).await
            }
            _ if input.is_empty() => continue,
            action => {
                let answer = render::resolve_choice(action, input);
                match app.dispatcher().submit_answer(&user_id, &answer).await {
                    Ok(outcome) => {
                        if let Some(feedback) = &outcome.feedback {
                            println!("{}", render::feedback(feedback));
                        }
                        if let Some(placement) = &outcome.placement {
                            println!("{}", render::placement(placement));
                        }
                        Ok(outcome.action)
                    }
                    Err(e) => Err(e),
                }
            }
        };

        match result {
            Ok(action) => {
                current = action;
                println!("\n{}", render::action(&current));
            }
            Err(e) => recover(e)?,
        }
    }

    println!("Goodbye! 👋");
    Ok(())
}

/// Ask for the learner's name and grade, then register them
async fn onboard(
    app: &LinguaApp,
    rl: &mut DefaultEditor,
    user_id: &UserId,
    mut name: Option<String>,
    mut grade: Option<u8>,
) -> Result<Option<NextAction>, CliError> {
    println!("{}", render::WELCOME);

    loop {
        let display_name = match name.take() {
            Some(name) => name,
            None => match read(rl)? {
                Some(line) => line.trim().to_string(),
                None => return Ok(None),
            },
        };

        let learner_grade = match grade.take() {
            Some(grade) => grade,
            None => {
                println!("Nice to meet you, {}! Which grade are you in? (5-9)", display_name);
                match read(rl)? {
                    Some(line) => match line.trim().parse::<u8>() {
                        Ok(grade) => grade,
                        Err(_) => {
                            println!("Please type a number from 5 to 9.");
                            name = Some(display_name);
                            continue;
                        }
                    },
                    None => return Ok(None),
                }
            }
        };

        match app
            .dispatcher()
            .register(user_id.clone(), &display_name, Some(learner_grade))
            .await
        {
            Ok(action) => {
                info!(user_id = %user_id, grade = learner_grade, "Learner registered");
                println!(
                    "\nFirst, a short placement test of {} questions.",
                    app.dispatcher().config().placement_question_count
                );
                return Ok(Some(action));
            }
            Err(LinguaError::Core(e)) if e.is_recoverable() => {
                println!("⚠️  {}", e);
                if display_name.trim().is_empty() {
                    println!("What's your name?");
                } else {
                    name = Some(display_name);
                }
            }
            Err(e) => return Err(e.into()),
        }
    }
}

async fn practice(app: &LinguaApp, user_id: &UserId, message: &str, mode: DialogueMode) {
    match app.dialogue().reply(user_id, message, mode).await {
        Ok(reply) => {
            if reply.degraded {
                println!("(offline reply)");
            }
            println!("🤖 {}", reply.text);
        }
        Err(e) => println!("⚠️  {}", e),
    }
}

/// Print errors the session can continue past; return the rest
fn recover(err: LinguaError) -> Result<(), CliError> {
    let recoverable = match &err {
        LinguaError::Core(e) => e.is_recoverable(),
        e => e.is_not_found(),
    };
    if recoverable {
        println!("⚠️  {}", err);
        Ok(())
    } else {
        Err(err.into())
    }
}

fn read(rl: &mut DefaultEditor) -> Result<Option<String>, CliError> {
    loop {
        match rl.readline(PROMPT) {
            Ok(line) => return Ok(Some(line)),
            Err(ReadlineError::Interrupted) => {
                println!("\nCtrl-C received. Use 'exit' to quit.");
            }
            Err(ReadlineError::Eof) => return Ok(None),
            Err(err) => return Err(err.into()),
        }
    }
}
