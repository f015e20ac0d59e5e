use std::net::{IpAddr, SocketAddr};

use clap::Parser;
use kanban_db::DbConfig;
use kanban_store::StoreConfig;

#[derive(Debug, Clone, Parser)]
#[command(name = "kanban-server", about = "Kanban board HTTP server")]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "KANBAN_BIND", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Port to listen on
    #[arg(long, env = "KANBAN_PORT", default_value = "5000")]
    pub port: u16,

    /// SQLite database file. Defaults to `<data dir>/kanban.db`.
    #[arg(long, env = "KANBAN_DB_PATH")]
    pub db_path: Option<String>,

    /// Directory holding uploaded blobs. Defaults to `<data dir>/uploads`.
    #[arg(long, env = "KANBAN_UPLOAD_DIR")]
    pub upload_dir: Option<String>,

    /// Browser origins allowed to call the API, comma separated
    #[arg(
        long,
        env = "KANBAN_ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_values = ["https://react-kanban-board-tanzil.netlify.app", "http://localhost:5173"]
    )]
    pub allowed_origins: Vec<String>,

    /// Largest request body accepted, in bytes
    #[arg(long, env = "KANBAN_MAX_UPLOAD_BYTES", default_value = "26214400")]
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            sqlite_path: self.db_path.clone(),
        }
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            local_data_dir: self.upload_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_flags_override_defaults() {
        let config = ServerConfig::try_parse_from([
            "kanban-server",
            "--bind",
            "127.0.0.1",
            "--port",
            "8080",
            "--db-path",
            "/tmp/board.db",
            "--upload-dir",
            "/tmp/uploads",
            "--allowed-origins",
            "http://a.test,http://b.test",
            "--max-upload-bytes",
            "1024",
        ])
        .unwrap();

        assert_eq!(config.addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.db_config().sqlite_path.as_deref(), Some("/tmp/board.db"));
        assert_eq!(
            config.store_config().local_data_dir.as_deref(),
            Some("/tmp/uploads")
        );
        assert_eq!(config.allowed_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.max_upload_bytes, 1024);
    }

    #[test]
    fn rejects_unparseable_port() {
        assert!(ServerConfig::try_parse_from(["kanban-server", "--port", "http"]).is_err());
    }
}
