//! Line-oriented terminal front end for the quiz.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use mathquiz_core::catalog::QuestionBank;
use mathquiz_core::model::QuizRules;
use services::{
    AnswerOutcome, Clock, QuizLoopService, QuizObserver, QuizSession, ScoreboardService,
    SessionError, SessionPhase, load_catalog,
};
use storage::repository::Storage;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::time::{self, MissedTickBehavior};

use crate::Args;

type InputLines = Lines<BufReader<Stdin>>;

/// Prints display updates straight to stdout.
struct TerminalObserver;

impl QuizObserver for TerminalObserver {
    fn on_question_changed(&self, prompt: &str) {
        println!();
        println!("Question: {prompt}");
        prompt_for_input("> ");
    }

    fn on_score_changed(&self, score: u32) {
        println!("Score: {score}");
    }

    fn on_session_ended(&self) {
        println!();
        println!("Session over.");
    }
}

fn prompt_for_input(text: &str) {
    print!("{text}");
    if let Err(err) = std::io::stdout().flush() {
        tracing::debug!(error = %err, "failed to flush stdout");
    }
}

pub(crate) async fn play(args: &Args, storage: &Storage) -> Result<(), Box<dyn std::error::Error>> {
    let bank = match &args.catalog {
        Some(path) => load_catalog(path)?,
        None => QuestionBank::builtin()?,
    };
    let loop_svc = QuizLoopService::new(
        Clock::default_clock(),
        Arc::clone(&storage.scores),
        Arc::new(TerminalObserver),
    );

    let mut session = QuizSession::new(Arc::new(bank), QuizRules::default());
    if let Some(seed) = args.seed {
        session = session.with_seed(seed);
    }
    session.configure(args.subjects.iter().copied(), args.difficulty)?;
    tracing::info!(session_id = %session.id(), "starting quiz");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("Type your answer and press enter. :skip for a new question, :quit to stop.");
    loop_svc.start(&mut session)?;

    let mut ticker = time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    // Ticks and answers are handled one at a time on this task, so a tick can never
    // land between an accepted answer and the next draw.
    while session.phase() == SessionPhase::Active {
        tokio::select! {
            _ = ticker.tick() => {
                loop_svc.tick(&mut session);
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    loop_svc.finish(&mut session)?;
                    break;
                };
                handle_line(&loop_svc, &mut session, line.trim())?;
            }
        }
    }

    let summary = session.summary();
    println!(
        "Final score: {} ({} correct, {} attempts, {} skipped)",
        summary.score, summary.questions_completed, summary.attempts, summary.skips
    );
    offer_save(&loop_svc, &mut session, &mut lines).await?;
    Ok(())
}

fn handle_line(
    loop_svc: &QuizLoopService,
    session: &mut QuizSession,
    input: &str,
) -> Result<(), SessionError> {
    match input {
        "" => prompt_for_input("> "),
        ":quit" => {
            loop_svc.finish(session)?;
        }
        ":skip" => loop_svc.skip(session)?,
        text => {
            let elapsed = session.elapsed();
            match loop_svc.submit(session, text, elapsed)? {
                AnswerOutcome::Incorrect => {
                    println!("Not quite. Clock keeps running ({elapsed}s).");
                    prompt_for_input("> ");
                }
                AnswerOutcome::Correct { points } | AnswerOutcome::Finished { points } => {
                    println!("Correct! +{points} in {elapsed}s");
                }
            }
        }
    }
    Ok(())
}

/// Ask for a name until one validates, the player declines with a blank line, or
/// stdin closes. A failed save is reported and the quiz still exits cleanly.
async fn offer_save(
    loop_svc: &QuizLoopService,
    session: &mut QuizSession,
    lines: &mut InputLines,
) -> std::io::Result<()> {
    loop {
        prompt_for_input("Enter a name to save your score (blank to skip): ");
        let Some(line) = lines.next_line().await? else {
            println!();
            return Ok(());
        };
        if line.trim().is_empty() {
            return Ok(());
        }
        match loop_svc.save_score(session, &line).await {
            Ok(_) => {
                println!("Saved.");
                return Ok(());
            }
            Err(SessionError::Name(err)) => println!("{err}"),
            Err(err) => {
                println!("Could not save score: {err}");
                return Ok(());
            }
        }
    }
}

pub(crate) async fn print_scores(storage: &Storage) -> Result<(), Box<dyn std::error::Error>> {
    let scoreboard = ScoreboardService::new(Clock::default_clock(), Arc::clone(&storage.scores));
    let rows = scoreboard.list_all().await?;
    if rows.is_empty() {
        println!("No scores yet.");
        return Ok(());
    }

    println!(
        "{:>4}  {:<20}  {:>6}  {:<10}  {:<30}  {}",
        "#", "Name", "Score", "Difficulty", "Subjects", "Date"
    );
    for (rank, row) in rows.iter().enumerate() {
        let record = &row.record;
        println!(
            "{:>4}  {:<20}  {:>6}  {:<10}  {:<30}  {}",
            rank + 1,
            record.player_name().as_str(),
            record.score(),
            record.difficulty().as_str(),
            record.subjects_label(),
            record.created_at().format("%Y-%m-%d %H:%M"),
        );
    }
    Ok(())
}
