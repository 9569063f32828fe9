use std::io::{self, BufRead, Write};

use chess_rules::config::SessionConfig;
use chess_rules::engine::{ChessError, Commit};
use chess_rules::session::Session;

const HELP: &str = "\
commands:
  <move>        play a move (e2e4, e7e8q, Nf3, O-O)
  moves         list legal moves
  board         print the board
  fen           print the current FEN
  load <fen>    start over from a position
  undo          take back the last move
  history       print the movetext
  pgn           print the game as PGN
  frame <raw>   feed raw relay text (e.g. p|e7e5\\)
  help, quit";

fn main() {
    // Initialize tracing (structured logging).
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chess_rules=info".into()),
        )
        .init();

    let config = SessionConfig::from_env();
    let mut session = match Session::from_config(&config) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("cannot start session: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!("chess-rules v{} ready", env!("CARGO_PKG_VERSION"));
    println!("{HELP}");
    show(&session);

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        engine_turn(&mut session);
        flush_outbound(&mut session);

        print!("> ");
        if let Err(e) = io::stdout().flush() {
            tracing::warn!(error = %e, "stdout closed");
            break;
        }
        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        let (cmd, arg) = input.split_once(' ').unwrap_or((input, ""));
        match cmd {
            "" => {}
            "quit" | "exit" => break,
            "help" => println!("{HELP}"),
            "board" => show(&session),
            "fen" => println!("{}", session.game().export_position()),
            "history" => println!("{}", session.game().export_move_history()),
            "pgn" => print!("{}", session.pgn()),
            "moves" => {
                let game = session.game();
                let list: Vec<String> = game.legal_moves().moves().map(|m| m.to_string()).collect();
                println!("{}", list.join(" "));
            }
            "undo" => match session.take_back() {
                Ok(_) => show(&session),
                Err(e) => println!("error: {e}"),
            },
            "load" => match reload(&mut session, &config, arg) {
                Ok(()) => show(&session),
                Err(e) => println!("error: {e}"),
            },
            "frame" => {
                session.receive(arg);
                drain_inbound(&mut session);
            }
            _ => match session.play_local(input) {
                Ok(Commit::Played(record)) => {
                    println!("{} ({})", record.san, record.state_after);
                    show(&session);
                }
                Ok(Commit::PromotionPending { from, to }) => {
                    println!("promotion pending on {from}{to}: repeat with q, r, b or n");
                }
                Err(e) => println!("error: {e}"),
            },
        }
    }
}

fn reload(session: &mut Session, config: &SessionConfig, fen: &str) -> Result<(), ChessError> {
    let config = SessionConfig {
        start_fen: fen.trim().to_string(),
        ..config.clone()
    };
    *session = Session::from_config(&config)?;
    Ok(())
}

fn engine_turn(session: &mut Session) {
    if !session.engine_to_move() {
        return;
    }
    match session.request_engine_move() {
        Ok(true) => drain_inbound(session),
        Ok(false) => {}
        Err(e) => println!("engine error: {e}"),
    }
}

fn drain_inbound(session: &mut Session) {
    while let Some(outcome) = session.handle_next() {
        match outcome {
            Ok(event) => {
                println!("{event:?}");
                show(session);
            }
            Err(e) => println!("error: {e}"),
        }
    }
}

fn flush_outbound(session: &mut Session) {
    for frame in session.drain_outbound() {
        println!("relay <- {frame}");
    }
}

fn show(session: &Session) {
    let game = session.game();
    println!("{}", game.board().board_string());
    println!("{} to move, {}", game.side_to_move(), game.state());
}
