//! `.netrc` credentials for the file server.

use gf_error::{GfError, Result};
use std::fmt;
use std::fs::OpenOptions;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Host serving the granule files.
pub const DEFAULT_HOST: &str = "tds-odatis.aviso.altimetry.fr";

/// A login and password pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

impl Credentials {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"***")
            .finish()
    }
}

/// Asks the user for credentials missing from the store.
pub trait CredentialPrompt {
    fn prompt(&self, host: &str) -> Result<Credentials>;
}

/// Prompts on stderr and reads the answers from stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompt;

impl CredentialPrompt for StdinPrompt {
    fn prompt(&self, host: &str) -> Result<Credentials> {
        info!("Credentials required for {}", host);
        let stdin = std::io::stdin();
        let mut input = stdin.lock();

        let mut ask = |label: &str| -> Result<String> {
            eprint!("{label} : ");
            std::io::stderr().flush()?;
            let mut answer = String::new();
            input.read_line(&mut answer)?;
            Ok(answer.trim_end_matches(['\r', '\n']).to_string())
        };

        let login = ask("Username")?;
        let password = ask("Password")?;
        if login.is_empty() || password.is_empty() {
            return Err(GfError::Credentials(format!(
                "Empty login or password given for {host}"
            )));
        }
        Ok(Credentials::new(login, password))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct NetrcEntry {
    /// `None` for the `default` entry
    machine: Option<String>,
    login: Option<String>,
    password: Option<String>,
}

/// Credentials read from, and appended to, a `.netrc` file.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store backed by `~/.netrc`.
    ///
    /// # Errors
    ///
    /// Returns [`GfError::Credentials`] when no home directory can be found.
    pub fn user_default() -> Result<Self> {
        let dirs = directories::BaseDirs::new().ok_or_else(|| {
            GfError::Credentials("Cannot locate the home directory".to_string())
        })?;
        Ok(Self::new(dirs.home_dir().join(".netrc")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Credentials stored for `host`, falling back to the `default` entry.
    ///
    /// A missing file yields `None`.
    ///
    /// # Errors
    ///
    /// Returns [`GfError::Credentials`] when the file is malformed.
    pub fn lookup(&self, host: &str) -> Result<Option<Credentials>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No netrc file");
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)?;
        let entries = parse_netrc(&content).map_err(|reason| {
            GfError::Credentials(format!(
                "Syntax error in {}: {reason}",
                self.path.display()
            ))
        })?;

        let entry = entries
            .iter()
            .find(|e| e.machine.as_deref() == Some(host))
            .or_else(|| entries.iter().find(|e| e.machine.is_none()));

        Ok(entry.and_then(|e| match (&e.login, &e.password) {
            (Some(login), Some(password)) => Some(Credentials::new(login, password)),
            _ => None,
        }))
    }

    /// Stored credentials for `host`, or prompted ones saved for next time.
    pub fn ensure(&self, host: &str, prompt: &dyn CredentialPrompt) -> Result<Credentials> {
        if let Some(credentials) = self.lookup(host)? {
            return Ok(credentials);
        }
        let credentials = prompt.prompt(host)?;
        self.save(host, &credentials)?;
        Ok(credentials)
    }

    /// Append an entry for `host` and restrict the file to its owner.
    pub fn save(&self, host: &str, credentials: &Credentials) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(
            file,
            "\nmachine {host} login {} password {}",
            credentials.login, credentials.password
        )?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        info!(path = %self.path.display(), host, "Saved credentials");
        Ok(())
    }
}

fn parse_netrc(content: &str) -> std::result::Result<Vec<NetrcEntry>, String> {
    let mut entries: Vec<NetrcEntry> = Vec::new();
    let mut lines = content.lines();

    // Tokens are processed line by line so `macdef` bodies can be skipped.
    let mut pending: Vec<String> = Vec::new();
    loop {
        if pending.is_empty() {
            let Some(line) = lines.next() else { break };
            let line = line.split('#').next().unwrap_or_default();
            pending = line.split_whitespace().rev().map(str::to_string).collect();
            continue;
        }

        let Some(token) = pending.pop() else { continue };
        match token.as_str() {
            "machine" => {
                let machine = next_token(&mut pending, &mut lines, "machine")?;
                entries.push(NetrcEntry {
                    machine: Some(machine),
                    login: None,
                    password: None,
                });
            }
            "default" => entries.push(NetrcEntry {
                machine: None,
                login: None,
                password: None,
            }),
            "login" | "password" | "account" => {
                let value = next_token(&mut pending, &mut lines, &token)?;
                let Some(entry) = entries.last_mut() else {
                    return Err(format!("'{token}' outside of a machine entry"));
                };
                match token.as_str() {
                    "login" => entry.login = Some(value),
                    "password" => entry.password = Some(value),
                    _ => {}
                }
            }
            "macdef" => {
                pending.clear();
                for line in lines.by_ref() {
                    if line.trim().is_empty() {
                        break;
                    }
                }
            }
            other => return Err(format!("unexpected token '{other}'")),
        }
    }

    Ok(entries)
}

fn next_token<'a>(
    pending: &mut Vec<String>,
    lines: &mut impl Iterator<Item = &'a str>,
    keyword: &str,
) -> std::result::Result<String, String> {
    while pending.is_empty() {
        let Some(line) = lines.next() else {
            return Err(format!("missing value after '{keyword}'"));
        };
        pending.extend(line.split_whitespace().rev().map(str::to_string));
    }
    pending
        .pop()
        .ok_or_else(|| format!("missing value after '{keyword}'"))
}
