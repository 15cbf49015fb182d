use clap::Parser;
use std::path::PathBuf;

/// Sign in to a server from the terminal
#[derive(Debug, Parser)]
#[clap(version)]
pub struct Config {
    /// Which server should we sign in to? Only the protocol and domain, e.g.
    /// `https://auth.your-domain.com`.
    #[clap(long, env = "LOGIN_SERVER", default_value = "http://localhost:3000")]
    pub server: String,

    /// Shortest password we'll bother sending to the server.
    #[clap(long, env = "LOGIN_MIN_PASSWORD_LENGTH", default_value = "6")]
    pub min_password_length: usize,

    /// Where should we keep logs?
    #[clap(long)]
    data_dir: Option<PathBuf>,
}

impl Config {
    /// Get either the configured or a default data directory. If no data
    /// directory can be found (e.g. because `$HOME` is unset) we will use the
    /// current directory.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| {
                directories::ProjectDirs::from("dev", "login", "login")
                    .map(|dirs| dirs.data_local_dir().to_owned())
            })
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn explicit_data_dir_wins() {
        let config = Config::try_parse_from(["login", "--data-dir", "/tmp/login"]).unwrap();

        assert_eq!(config.data_dir(), PathBuf::from("/tmp/login"));
    }

    #[test]
    fn takes_server_and_password_length() {
        let config = Config::try_parse_from([
            "login",
            "--server",
            "https://auth.example.com",
            "--min-password-length",
            "10",
        ])
        .unwrap();

        assert_eq!(config.server, "https://auth.example.com");
        assert_eq!(config.min_password_length, 10);
    }

    #[test]
    fn rejects_non_numeric_password_length() {
        assert!(Config::try_parse_from(["login", "--min-password-length", "lots"]).is_err());
    }
}
