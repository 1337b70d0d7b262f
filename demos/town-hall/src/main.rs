//! Plays a scripted mafia game through the command layer.
//!
//! Each script line is `<actor> <command> [args...]`, as a venue integration
//! would tokenise a post. Lines starting with `#` are skipped.
//!
//! ```text
//! cargo run -p town-hall                      # built-in script, fresh temp dir
//! cargo run -p town-hall -- game.txt ./data   # your script and data dir
//! ```

use std::path::PathBuf;

use nightfall::prelude::*;
use tempfile::TempDir;

const TOPIC: GameId = GameId(45);

const SCRIPT: &str = "
# signups
Garnet prepare Beach City
Lars join
Sadie join
Steven join
Pearl join
Amethyst join
Garnet start
Garnet set Sadie loved
Garnet set Amethyst mafia

# day 1
Lars vote for @Sadie
Steven vote Sadie
Lars unvote
Lars vote Amethyst
Pearl for Amethyst
list-votes
Steven vote Amethyst

# night 1
Lars vote Steven
Steven target Pearl
Garnet kill Pearl
Garnet new-day ends Friday at noon

# day 2
list-players
Sadie nolynch
Steven nolynch
Garnet end
";

// ---------------------------------------------------------------------------
// Script playback
// ---------------------------------------------------------------------------

/// Parses one script line. Returns `Ok(None)` for blanks and comments.
///
/// A line holding only a command is posted by the first signup, so listings
/// read naturally in the script.
fn parse_line(event: EventId, line: &str) -> Result<Option<CommandRequest>, NightfallError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let words: Vec<&str> = line.split_whitespace().collect();
    let (actor, command, args) = match words.as_slice() {
        [command] => ("Lars", *command, &[][..]),
        [actor, command, args @ ..] => (*actor, *command, args),
        [] => return Ok(None),
    };
    let kind: CommandKind = command.parse()?;
    Ok(Some(
        CommandRequest::new(TOPIC, event, actor, kind).with_args(args.iter().copied()),
    ))
}

/// Runs every line of `script`, returning the replies in order.
///
/// Rule violations are logged and skipped; a game can't be derailed by one
/// bad post.
async fn play<B: Backend>(ctx: &Context<B>, script: &str) -> Vec<Reply> {
    let mut replies = Vec::new();
    for (line_no, line) in script.lines().enumerate() {
        let event = EventId(line_no as u64 + 1);
        let request = match parse_line(event, line) {
            Ok(Some(request)) => request,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(line = line_no + 1, error = %e, "unparseable line");
                continue;
            }
        };

        match ctx.handle(&request).await {
            Ok(Reply::Ignored) => {
                tracing::debug!(line = line_no + 1, "ignored");
            }
            Ok(reply) => {
                match serde_json::to_string(&reply) {
                    Ok(json) => println!("{json}"),
                    Err(e) => tracing::warn!(error = %e, "reply not serializable"),
                }
                replies.push(reply);
            }
            Err(e) => {
                tracing::warn!(
                    line = line_no + 1,
                    actor = %request.actor,
                    command = %request.kind,
                    error = %e,
                    "command rejected"
                );
            }
        }
    }
    replies
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

/// The store directory: the one given, or a scratch dir removed when the
/// returned guard drops.
fn data_dir(arg: Option<String>) -> std::io::Result<(PathBuf, Option<TempDir>)> {
    match arg {
        Some(dir) => Ok((PathBuf::from(dir), None)),
        None => {
            let scratch = tempfile::tempdir()?;
            Ok((scratch.path().to_path_buf(), Some(scratch)))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut args = std::env::args().skip(1);
    let script = match args.next() {
        Some(path) => tokio::fs::read_to_string(&path).await?,
        None => SCRIPT.to_string(),
    };

    let (dir, _scratch) = data_dir(args.next())?;
    tracing::info!(dir = %dir.display(), "storing games on disk");

    let ctx = Context::builder().data_dir(dir).build_file().await?;
    let replies = play(&ctx, &script).await;

    tracing::info!(replies = replies.len(), "script finished");
    Ok(())
}
