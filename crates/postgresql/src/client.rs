use crate::ConnectOpts;
use dump_core::{DumpError, Result};
use std::str::FromStr;
use tokio_postgres::{Client, Config, NoTls};
use tracing::{error, info};

/// Build the driver configuration from the connection options
pub(crate) fn pg_config(opts: &ConnectOpts) -> Result<Config> {
    if let Some(connection_string) = &opts.connection_string {
        return Config::from_str(connection_string)
            .map_err(|e| DumpError::database("parsing connection string", e));
    }

    let mut config = Config::new();
    config
        .host(&opts.host)
        .port(opts.port)
        .user(&opts.user)
        .dbname(&opts.dbname);
    if let Some(password) = &opts.password {
        config.password(password);
    }
    Ok(config)
}

/// Connect to PostgreSQL and spawn the connection driver task
pub async fn new_postgresql_client(opts: &ConnectOpts) -> Result<Client> {
    let config = pg_config(opts)?;
    info!(
        "Connecting to {} with user {}",
        opts.display_target(),
        config.get_user().unwrap_or("<default>")
    );

    let (client, connection) = config
        .connect(NoTls)
        .await
        .map_err(|e| DumpError::database("connecting to PostgreSQL", e))?;

    // Spawn connection handler
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            error!("PostgreSQL connection error: {e}");
        }
    });

    info!("Connection successful");
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_fields() {
        let opts = ConnectOpts {
            host: "db".to_string(),
            port: 6543,
            user: "dumper".to_string(),
            password: Some("pw".to_string()),
            dbname: "inventory".to_string(),
            ..Default::default()
        };
        let config = pg_config(&opts).unwrap();
        assert_eq!(config.get_user(), Some("dumper"));
        assert_eq!(config.get_dbname(), Some("inventory"));
        assert_eq!(config.get_ports(), &[6543]);
        assert_eq!(config.get_password(), Some(&b"pw"[..]));
    }

    #[test]
    fn test_connection_string_wins() {
        let opts = ConnectOpts {
            connection_string: Some("host=other user=alice dbname=sales".to_string()),
            user: "ignored".to_string(),
            ..Default::default()
        };
        let config = pg_config(&opts).unwrap();
        assert_eq!(config.get_user(), Some("alice"));
        assert_eq!(config.get_dbname(), Some("sales"));
    }

    #[test]
    fn test_invalid_connection_string() {
        let opts = ConnectOpts {
            connection_string: Some("postgresql://host:notaport/db".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            pg_config(&opts),
            Err(DumpError::Database { .. })
        ));
    }
}
