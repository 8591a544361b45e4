//! Terminal front-end: deck management subcommands and an interactive quiz.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::Config;
use crate::database::{KeyValueStore, MemoryStore, SqliteStore};
use crate::error::{Error, Result};
use crate::export::{export_json_to_path, import_json};
use crate::models::{DEFAULT_STORAGE_KEY, DeckStore, QuizPhase, QuizSession, normalize_input};

#[derive(Parser)]
#[command(name = "flashcards", about = "Offline flashcard decks and quizzes", version)]
pub struct Cli {
    /// Database file (default: local data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Dry run: start from an empty in-memory collection and discard every
    /// change when the command exits
    #[arg(long, global = true, conflicts_with = "db")]
    in_memory: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all decks, newest first
    Decks,

    /// Create a new deck
    NewDeck {
        title: String,
    },

    /// Add a card to a deck
    AddCard {
        deck_id: String,
        question: String,
        answer: String,
    },

    /// Show a deck and its cards
    Show {
        deck_id: String,
    },

    /// Delete a deck and all of its cards
    DeleteDeck {
        deck_id: String,
    },

    /// Delete a single card
    DeleteCard {
        deck_id: String,
        card_id: String,
    },

    /// Take a self-graded quiz over a deck
    Quiz {
        deck_id: String,
        /// Shuffle the cards before starting
        #[arg(long)]
        shuffle: bool,
        /// Seed for the shuffle, for a repeatable order
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Write a deck to a JSON file
    Export {
        deck_id: String,
        path: PathBuf,
    },

    /// Add a deck from a JSON file
    Import {
        path: PathBuf,
    },
}

pub fn entrypoint() -> Result<()> {
    let cli = Cli::parse();

    let (backend, storage_key): (Box<dyn KeyValueStore>, String) = if cli.in_memory {
        (Box::new(MemoryStore::new()), DEFAULT_STORAGE_KEY.to_string())
    } else {
        let config = Config::resolve(cli.db)?;
        config.ensure_parent_dir()?;
        (
            Box::new(SqliteStore::open(&config.database_path)?),
            config.storage_key,
        )
    };

    let mut store = DeckStore::new(backend).with_storage_key(storage_key);
    store.load()?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    run(cli.command, &mut store, &mut stdin.lock(), &mut stdout)
}

fn run<S, G>(
    command: Command,
    store: &mut DeckStore<S, G>,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<()>
where
    S: KeyValueStore,
    G: Rng,
{
    match command {
        Command::Decks => {
            if store.decks().is_empty() {
                writeln!(out, "No decks yet. Create your first deck to start studying offline.")?;
            }
            for deck in store.decks() {
                writeln!(out, "{}  {} ({})", deck.id, deck.title, deck.card_count_label())?;
            }
        }
        Command::NewDeck { title } => {
            let title = normalize_input(&title)
                .ok_or_else(|| Error::InvalidInput("Please enter a deck title.".to_string()))?;
            let deck = store.create_deck(&title);
            writeln!(out, "Created deck {} ({})", deck.title, deck.id)?;
        }
        Command::AddCard {
            deck_id,
            question,
            answer,
        } => {
            let (Some(question), Some(answer)) =
                (normalize_input(&question), normalize_input(&answer))
            else {
                return Err(Error::InvalidInput(
                    "Add both a question and answer.".to_string(),
                ));
            };
            let deck = store
                .add_card(&deck_id, &question, &answer)
                .ok_or(Error::DeckNotFound(deck_id))?;
            writeln!(out, "Added card to {} ({})", deck.title, deck.card_count_label())?;
        }
        Command::Show { deck_id } => {
            let deck = store.find_by_id(&deck_id).ok_or(Error::DeckNotFound(deck_id.clone()))?;
            writeln!(out, "{}", deck.title)?;
            writeln!(out, "{}", deck.card_count_label())?;
            if deck.cards.is_empty() {
                writeln!(out, "No cards yet. Add a few cards and start your first quiz.")?;
            }
            for (index, card) in deck.cards.iter().enumerate() {
                writeln!(out)?;
                writeln!(out, "Card {}  [{}]", index + 1, card.id)?;
                writeln!(out, "  Q: {}", card.question)?;
                writeln!(out, "  A: {}", card.answer)?;
            }
        }
        Command::DeleteDeck { deck_id } => {
            let title = store
                .find_by_id(&deck_id)
                .map(|deck| deck.title.clone())
                .ok_or(Error::DeckNotFound(deck_id.clone()))?;
            store.delete_deck(&deck_id);
            writeln!(out, "Deleted deck {title} and all its cards")?;
        }
        Command::DeleteCard { deck_id, card_id } => {
            let deck = store.find_by_id(&deck_id).ok_or(Error::DeckNotFound(deck_id.clone()))?;
            if deck.find_card(&card_id).is_none() {
                return Err(Error::CardNotFound(card_id));
            }
            store.delete_card(&deck_id, &card_id);
            writeln!(out, "Deleted card {card_id}")?;
        }
        Command::Quiz {
            deck_id,
            shuffle,
            seed,
        } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            match QuizSession::for_deck(store, &deck_id, shuffle, &mut rng) {
                Ok(mut session) => run_quiz(&mut session, input, out)?,
                Err(e) => writeln!(out, "{e}")?,
            }
        }
        Command::Export { deck_id, path } => {
            let deck = store.find_by_id(&deck_id).ok_or(Error::DeckNotFound(deck_id.clone()))?;
            export_json_to_path(deck, &path)?;
            writeln!(out, "Exported {} to {}", deck.title, path.display())?;
        }
        Command::Import { path } => {
            let deck = store.import_deck(import_json(&path)?);
            writeln!(
                out,
                "Imported {} ({}) as {}",
                deck.title,
                deck.card_count_label(),
                deck.id
            )?;
        }
    }

    // This process exits right after, so a failed write must be reported now.
    if store.has_unsaved_changes() {
        store.flush()?;
    }
    Ok(())
}

/// Drives a quiz from line-based input until it is quit or input runs out.
///
/// Empty line flips the card, `y`/`n` grade it, `r` restarts a finished quiz
/// and `q` quits.
pub fn run_quiz(
    session: &mut QuizSession,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    loop {
        let phase = session.phase();
        match phase {
            QuizPhase::Question | QuizPhase::Answer => {
                if let (Some(card), Some((number, total))) =
                    (session.current_card(), session.progress())
                {
                    writeln!(out, "Card {number} / {total}")?;
                    writeln!(out, "Q: {}", card.question)?;
                    if phase == QuizPhase::Answer {
                        writeln!(out, "A: {}", card.answer)?;
                    }
                }
                writeln!(out, "[enter] flip  [y] correct  [n] incorrect  [q] quit")?;
            }
            QuizPhase::Finished => {
                if let Some(score) = session.score() {
                    writeln!(out, "Quiz complete")?;
                    writeln!(out, "{}/{} correct", score.correct, score.total)?;
                    writeln!(out, "{}% score", score.percentage)?;
                }
                writeln!(out, "[r] restart  [q] quit")?;
            }
        }
        out.flush()?;

        let Some(line) = read_line(input)? else {
            return Ok(());
        };
        match (phase, line.as_str()) {
            (_, "q") => return Ok(()),
            (QuizPhase::Finished, "r") => session.restart(),
            (QuizPhase::Question | QuizPhase::Answer, "") => session.toggle_reveal(),
            (QuizPhase::Question | QuizPhase::Answer, "y") => session.answer(true),
            (QuizPhase::Question | QuizPhase::Answer, "n") => session.answer(false),
            _ => writeln!(out, "Unrecognized input: {line:?}")?,
        }
    }
}

/// Next trimmed, lowercased line, or `None` at end of input.
fn read_line(input: &mut impl BufRead) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_lowercase()))
}
