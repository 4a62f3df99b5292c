//! Extraction and application of `<`, `>`, `>>` and `2>`.

use log::debug;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use thiserror::Error;

/// Permission bits for files created by `>`, `>>` and `2>`.
const CREATE_MODE: u32 = 0o644;

/// Kind of redirection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    /// `<`: read standard input from a file.
    Input,
    /// `>` and `2>`: write to a file, truncating it first.
    Output,
    /// `>>`: write to a file, appending to it.
    Append,
}

/// Standard stream a redirection is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdin,
    Stdout,
    Stderr,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stream::Stdin => "input",
            Stream::Stdout => "output",
            Stream::Stderr => "error",
        })
    }
}

/// A file named after a redirection operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub path: PathBuf,
    pub kind: RedirectKind,
}

impl Target {
    fn open(&self) -> io::Result<File> {
        let mut options = OpenOptions::new();
        match self.kind {
            RedirectKind::Input => options.read(true),
            RedirectKind::Output => options.write(true).create(true).truncate(true),
            RedirectKind::Append => options.append(true).create(true),
        };
        options.mode(CREATE_MODE).open(&self.path)
    }
}

#[derive(Debug, Error)]
pub enum RedirectionError {
    #[error("missing file after '{0}'")]
    MissingFile(&'static str),

    #[error("multiple {0} redirections not allowed")]
    MultipleRedirections(Stream),

    #[error("failed to open {stream} file '{file}': {source}")]
    Open {
        stream: Stream,
        file: String,
        #[source]
        source: io::Error,
    },
}

/// Redirection targets of a single command, at most one per stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Redirections {
    pub stdin: Option<Target>,
    pub stdout: Option<Target>,
    pub stderr: Option<Target>,
}

impl Redirections {
    pub fn is_empty(&self) -> bool {
        self.stdin.is_none() && self.stdout.is_none() && self.stderr.is_none()
    }

    fn slot(&mut self, stream: Stream) -> &mut Option<Target> {
        match stream {
            Stream::Stdin => &mut self.stdin,
            Stream::Stdout => &mut self.stdout,
            Stream::Stderr => &mut self.stderr,
        }
    }

    fn set(&mut self, stream: Stream, target: Target) -> Result<(), RedirectionError> {
        let slot = self.slot(stream);
        if slot.is_some() {
            return Err(RedirectionError::MultipleRedirections(stream));
        }
        *slot = Some(target);
        Ok(())
    }

    /// Open every target and bind it to the matching stream of `cmd`.
    ///
    /// Only the child's streams change; the interpreter keeps its own.
    pub fn apply(&self, cmd: &mut Command) -> Result<(), RedirectionError> {
        if let Some(target) = &self.stdin {
            cmd.stdin(open_stdio(Stream::Stdin, target)?);
        }
        if let Some(target) = &self.stdout {
            cmd.stdout(open_stdio(Stream::Stdout, target)?);
        }
        if let Some(target) = &self.stderr {
            cmd.stderr(open_stdio(Stream::Stderr, target)?);
        }
        Ok(())
    }
}

fn open_stdio(stream: Stream, target: &Target) -> Result<Stdio, RedirectionError> {
    debug!("binding {} to {} ({:?})", stream, target.path.display(), target.kind);
    let file = target.open().map_err(|source| RedirectionError::Open {
        stream,
        file: target.path.display().to_string(),
        source,
    })?;
    Ok(Stdio::from(file))
}

fn operator(token: &str) -> Option<(&'static str, Stream, RedirectKind)> {
    match token {
        "<" => Some(("<", Stream::Stdin, RedirectKind::Input)),
        ">" => Some((">", Stream::Stdout, RedirectKind::Output)),
        ">>" => Some((">>", Stream::Stdout, RedirectKind::Append)),
        "2>" => Some(("2>", Stream::Stderr, RedirectKind::Output)),
        _ => None,
    }
}

/// Strip redirection operators and their file operands from `args`.
///
/// Returns the remaining command words in their original order together with
/// the collected targets. Nothing is opened here.
pub fn resolve(args: Vec<String>) -> Result<(Vec<String>, Redirections), RedirectionError> {
    let mut command = Vec::with_capacity(args.len());
    let mut redirections = Redirections::default();
    let mut tokens = args.into_iter();

    while let Some(token) = tokens.next() {
        let Some((op, stream, kind)) = operator(&token) else {
            command.push(token);
            continue;
        };
        // An operator never names a file.
        let path = tokens
            .next()
            .filter(|next| operator(next).is_none())
            .ok_or(RedirectionError::MissingFile(op))?;
        redirections.set(
            stream,
            Target {
                path: PathBuf::from(path),
                kind,
            },
        )?;
    }

    Ok((command, redirections))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn words(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    fn make_unique_temp_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let p = std::env::temp_dir().join(format!(
            "redirection_test_{}_{}_{}",
            tag,
            std::process::id(),
            nanos
        ));
        std::fs::create_dir_all(&p).unwrap();
        p
    }

    #[test]
    fn plain_command_is_unchanged() {
        let (command, redirections) = resolve(words("ls -l foo")).unwrap();
        assert_eq!(command, words("ls -l foo"));
        assert!(redirections.is_empty());
    }

    #[test]
    fn output_redirection_is_removed() {
        let (command, redirections) = resolve(words("cmd > out.txt")).unwrap();
        assert_eq!(command, vec!["cmd"]);
        assert_eq!(
            redirections.stdout,
            Some(Target {
                path: PathBuf::from("out.txt"),
                kind: RedirectKind::Output
            })
        );
        assert!(redirections.stdin.is_none());
        assert!(redirections.stderr.is_none());
    }

    #[test]
    fn all_three_streams() {
        let (command, redirections) =
            resolve(words("sort -r < in.txt >> out.txt 2> err.txt")).unwrap();
        assert_eq!(command, vec!["sort", "-r"]);
        assert_eq!(redirections.stdin.unwrap().kind, RedirectKind::Input);
        assert_eq!(redirections.stdout.unwrap().kind, RedirectKind::Append);
        let stderr = redirections.stderr.unwrap();
        assert_eq!(stderr.kind, RedirectKind::Output);
        assert_eq!(stderr.path, PathBuf::from("err.txt"));
    }

    #[test]
    fn operators_between_arguments_keep_order() {
        let (command, _) = resolve(words("cmd a > out b < in c")).unwrap();
        assert_eq!(command, vec!["cmd", "a", "b", "c"]);
    }

    #[test]
    fn operator_is_not_accepted_as_a_file() {
        let err = resolve(words("cmd < > x")).unwrap_err();
        assert!(matches!(err, RedirectionError::MissingFile("<")));

        let err = resolve(words("cmd > >> x")).unwrap_err();
        assert!(matches!(err, RedirectionError::MissingFile(">")));

        let err = resolve(words("cmd 2> < x")).unwrap_err();
        assert_eq!(err.to_string(), "missing file after '2>'");
    }

    #[test]
    fn missing_file_is_reported() {
        for line in ["cmd <", "cmd < in.txt >", "cmd >>", "cmd 2>"] {
            let err = resolve(words(line)).unwrap_err();
            assert!(matches!(err, RedirectionError::MissingFile(_)), "{line}");
            assert!(err.to_string().starts_with("missing file"));
        }
    }

    #[test]
    fn second_redirection_of_a_stream_is_rejected() {
        let err = resolve(words("cmd > a >> b")).unwrap_err();
        assert!(matches!(
            err,
            RedirectionError::MultipleRedirections(Stream::Stdout)
        ));

        let err = resolve(words("cmd < a < b")).unwrap_err();
        assert_eq!(err.to_string(), "multiple input redirections not allowed");

        let err = resolve(words("cmd 2> a 2> b")).unwrap_err();
        assert!(matches!(
            err,
            RedirectionError::MultipleRedirections(Stream::Stderr)
        ));
    }

    #[test]
    fn truncate_and_append_open_modes() {
        let dir = make_unique_temp_dir("modes");
        let path = dir.join("out.txt");

        let truncate = Target {
            path: path.clone(),
            kind: RedirectKind::Output,
        };
        truncate.open().unwrap().write_all(b"first\n").unwrap();
        truncate.open().unwrap().write_all(b"second\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second\n");

        let append = Target {
            path: path.clone(),
            kind: RedirectKind::Append,
        };
        append.open().unwrap().write_all(b"third\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second\nthird\n");

        let mut contents = String::new();
        Target {
            path: path.clone(),
            kind: RedirectKind::Input,
        }
        .open()
        .unwrap()
        .read_to_string(&mut contents)
        .unwrap();
        assert_eq!(contents, "second\nthird\n");

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn created_files_are_0644() {
        use std::os::unix::fs::PermissionsExt;

        let dir = make_unique_temp_dir("perm");
        let path = dir.join("created.txt");
        Target {
            path: path.clone(),
            kind: RedirectKind::Output,
        }
        .open()
        .unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        // The process umask can only clear bits.
        assert_eq!(mode & !0o644, 0);
        assert_ne!(mode & 0o600, 0);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn apply_reports_missing_input_file() {
        let dir = make_unique_temp_dir("missing");
        let (_, redirections) = resolve(vec![
            "cat".into(),
            "<".into(),
            dir.join("nope.txt").to_string_lossy().into_owned(),
        ])
        .unwrap();

        let mut cmd = Command::new("cat");
        let err = redirections.apply(&mut cmd).unwrap_err();
        assert!(matches!(
            err,
            RedirectionError::Open {
                stream: Stream::Stdin,
                ..
            }
        ));
        assert!(err.to_string().contains("nope.txt"));

        let _ = std::fs::remove_dir_all(dir);
    }
}
