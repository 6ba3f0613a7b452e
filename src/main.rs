//! Small CLI around the `$6$` hasher. It prints crypt strings that can be
//! pasted into FTP virtual-user tables or shadow files; persisting them is
//! left to the operator.

use std::env;
use std::io::{self, BufRead};
use std::process::ExitCode;

use sha512crypt_rs::config::{load_config, load_config_from_env};
use sha512crypt_rs::crypto::salt::generate_salt;
use sha512crypt_rs::crypto::shacrypt::{
    hash_password_with_salt, hash_password_with_salt_len, verify_password,
};
use zeroize::Zeroizing;

fn print_usage() -> ExitCode {
    eprintln!("Commands:");
    eprintln!("  hash-password [plaintext] [salt]   (plaintext read from stdin when omitted)");
    eprintln!("  verify-password <plaintext> <crypt-string>");
    eprintln!("  gen-salt [length]");
    eprintln!("  load-config <path>");
    ExitCode::FAILURE
}

/// Reads one line and strips the trailing CR/LF; bytes inside the line are kept.
fn read_secret_line(mut reader: impl BufRead) -> io::Result<Zeroizing<String>> {
    let mut line = Zeroizing::new(String::new());
    reader.read_line(&mut line)?;
    let trimmed_len = line.trim_end_matches(&['\r', '\n'][..]).len();
    line.truncate(trimmed_len);
    Ok(line)
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return print_usage();
    }

    let config = match load_config_from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("config load failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    match args[1].as_str() {
        "hash-password" => {
            if args.len() > 4 {
                return print_usage();
            }
            let secret = match args.get(2) {
                Some(plaintext) => Zeroizing::new(plaintext.clone()),
                None => match read_secret_line(io::stdin().lock()) {
                    Ok(line) => line,
                    Err(err) => {
                        eprintln!("reading plaintext from stdin failed: {err}");
                        return ExitCode::FAILURE;
                    }
                },
            };
            let result = match args.get(3) {
                Some(salt) => hash_password_with_salt(secret.as_bytes(), salt),
                None => hash_password_with_salt_len(secret.as_bytes(), config.salt_length),
            };
            match result {
                Ok(hash) => println!("{hash}"),
                Err(err) => {
                    eprintln!("hashing failed: {err}");
                    return ExitCode::FAILURE;
                }
            }
        }
        "verify-password" => {
            if args.len() != 4 {
                return print_usage();
            }
            let matches = verify_password(args[2].as_bytes(), &args[3]);
            println!("{}", if matches { "match" } else { "no-match" });
            if !matches {
                return ExitCode::FAILURE;
            }
        }
        "gen-salt" => {
            if args.len() > 3 {
                return print_usage();
            }
            let length = match args.get(2).map(|raw| raw.parse::<usize>()) {
                Some(Ok(length)) => length,
                Some(Err(err)) => {
                    eprintln!("invalid salt length: {err}");
                    return ExitCode::FAILURE;
                }
                None => config.salt_length,
            };
            match generate_salt(length) {
                Ok(salt) => println!("{salt}"),
                Err(err) => {
                    eprintln!("salt generation failed: {err}");
                    return ExitCode::FAILURE;
                }
            }
        }
        "load-config" => {
            if args.len() != 3 {
                return print_usage();
            }
            match load_config(&args[2]) {
                Ok(cfg) => match serde_json::to_string_pretty(&cfg) {
                    Ok(json) => println!("{json}"),
                    Err(err) => {
                        eprintln!("config serialization failed: {err}");
                        return ExitCode::FAILURE;
                    }
                },
                Err(err) => {
                    eprintln!("config load failed: {err}");
                    return ExitCode::FAILURE;
                }
            }
        }
        _ => return print_usage(),
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::read_secret_line;
    use std::io::Cursor;

    fn read(input: &[u8]) -> String {
        read_secret_line(Cursor::new(input))
            .expect("reading from memory should succeed")
            .as_str()
            .to_owned()
    }

    #[test]
    fn strips_line_endings() {
        assert_eq!(read(b"pw\r\n"), "pw");
        assert_eq!(read(b"pw\n"), "pw");
        assert_eq!(read(b"pw"), "pw");
        assert_eq!(read(b""), "");
    }

    #[test]
    fn keeps_inner_carriage_returns() {
        assert_eq!(read(b"p\rw\r\n"), "p\rw");
    }

    #[test]
    fn reads_only_the_first_line() {
        assert_eq!(read(b"first\nsecond\n"), "first");
    }
}
