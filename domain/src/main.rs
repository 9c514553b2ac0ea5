use std::env;
use std::process;

use domain::normalize::normalize;
use domain::validate::validate;
use domain::ValidationResult;

fn print_usage() {
    eprintln!(
        "{}\n\nUsage:\n  domain normalize <link>\n  domain validate <link>\n\nNotes:\n  - Validation is offline; no DNS lookup or QR rendering is performed here.",
        domain::about()
    );
}

fn run(mut args: impl Iterator<Item = String>) -> Result<(), String> {
    let Some(cmd) = args.next() else {
        print_usage();
        return Ok(());
    };

    match cmd.as_str() {
        "normalize" => {
            let Some(raw) = args.next() else {
                return Err("missing <link> for normalize".into());
            };
            if let Some(unk) = args.next() {
                return Err(format!("unknown argument: {}", unk));
            }
            println!("{}", normalize(&raw));
            Ok(())
        }
        "validate" => {
            let Some(raw) = args.next() else {
                return Err("missing <link> for validate".into());
            };
            if let Some(unk) = args.next() {
                return Err(format!("unknown argument: {}", unk));
            }
            match validate(&raw) {
                ValidationResult::Valid(url) => {
                    println!("valid: {}", url);
                    Ok(())
                }
                ValidationResult::Invalid(reason) => Err(format!("invalid: {}", reason)),
            }
        }
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn main() {
    if let Err(msg) = run(env::args().skip(1)) {
        eprintln!("error: {}", msg);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn subcommands_accept_one_link() {
        assert!(run(args(&["normalize", "google.com"])).is_ok());
        assert!(run(args(&["validate", "google.com"])).is_ok());
    }

    #[test]
    fn subcommands_reject_extra_arguments() {
        for cmd in ["normalize", "validate"] {
            let err = run(args(&[cmd, "google.com", "extra"])).unwrap_err();
            assert_eq!(err, "unknown argument: extra", "{cmd}");
        }
    }

    #[test]
    fn missing_link_is_an_error() {
        assert!(run(args(&["normalize"])).is_err());
        assert!(run(args(&["validate"])).is_err());
    }

    #[test]
    fn invalid_link_reports_reason() {
        assert_eq!(
            run(args(&["validate", "google.xyz"])).unwrap_err(),
            "invalid: disallowed_tld"
        );
    }
}
