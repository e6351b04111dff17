//! # Upload Cycle
//!
//! One scheduled pass: read the latest observation, encode it, upload it.

use tracing::{debug, info};

use crate::aprs::encoder::encode;
use crate::aprs::protocol::AprsReport;
use crate::config::Config;
use crate::datalog::read_last_observation;
use crate::error::{CwopError, Result};
use crate::uploader::stream::Connector;
use crate::uploader::CwopUploader;

/// Run one read-encode-upload cycle
///
/// Any error aborts only this cycle; nothing is retried and no state is
/// carried into the next one.
///
/// # Returns
///
/// * `Result<AprsReport>` - The report that was sent
///
/// # Errors
///
/// - [`CwopError::DataLog`] / [`CwopError::InvalidRecord`] before any
///   connection is attempted
/// - [`CwopError::Connect`], [`CwopError::Transport`] or
///   [`CwopError::Timeout`] from the upload
pub async fn run_cycle<C: Connector>(
    config: &Config,
    uploader: &CwopUploader<C>,
) -> Result<AprsReport> {
    let datalog = config.datalog.clone();
    let observation = tokio::task::spawn_blocking(move || read_last_observation(&datalog))
        .await
        .map_err(|e| CwopError::DataLog(format!("data log reader task failed: {}", e)))??;

    debug!(?observation, "Read latest observation");

    let report = encode(&observation, &config.station)?;
    info!("Encoded report: {}", report);

    uploader.upload(&report, &config.station.id).await?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aprs::protocol::build_login_line;
    use crate::uploader::stream::{AsyncStream, MockConnector};
    use std::io::Write;
    use tempfile::NamedTempFile;
    use tokio_test::io::Builder;

    const REPORT_LINE: &str =
        "FW1234>APRS,TCPIP*:@151432z3037.13N/09620.38W_180/011g...t-28r050P300h00b10159\r\n";

    fn write_table(last_row: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "\"TOA5\",\"Mesonet\",\"CR1000\"\n\
             \"TIMESTAMP\",\"RECORD\",\"WD\",\"WS\",\"AT\",\"RH\",\"BP\",\"RN60\",\"RNDAY\"\n\
             \"TS\",\"RN\",\"Deg\",\"meters/second\",\"Deg C\",\"%\",\"hPa\",\"mm\",\"mm\"\n\
             \"\",\"\",\"Smp\",\"Avg\",\"Avg\",\"Smp\",\"Smp\",\"Tot\",\"Tot\"\n\
             {}\n",
            last_row
        )
        .unwrap();
        file.flush().unwrap();
        file
    }

    fn config_for(file: &NamedTempFile) -> Config {
        let toml = format!(
            r#"
[station]
id = "FW1234"
latitude = "3037.13N"
longitude = "09620.38W"
elevation_m = 67

[datalog]
path = "{}"
"#,
            file.path().display()
        );
        Config::from_toml(&toml).unwrap()
    }

    #[tokio::test]
    async fn test_cycle_reads_encodes_and_uploads() {
        let file = write_table("\"2024-03-15 14:32:00\",102,180,5,-2,100,1008,0.5,3");
        let config = config_for(&file);

        let login = build_login_line(
            "FW1234",
            &config.server.client_name,
            &config.server.client_version,
        );

        let mut connector = MockConnector::new();
        connector.expect_connect().times(1).returning(move |_, _| {
            let mock = Builder::new()
                .read(b"# aprsc 2.1.14\r\n")
                .write(login.as_bytes())
                .read(b"# logresp FW1234 unverified, server CWOP-2\r\n")
                .write(REPORT_LINE.as_bytes())
                .build();
            Ok(Box::new(mock) as Box<dyn AsyncStream>)
        });

        let uploader = CwopUploader::with_connector(connector, config.server.clone());
        let report = run_cycle(&config, &uploader).await.unwrap();
        assert_eq!(report.as_bytes(), REPORT_LINE.as_bytes());
    }

    #[tokio::test]
    async fn test_invalid_record_skips_upload() {
        let file = write_table("\"2024-03-15 14:32:00\",102,180,5,-2,120,1008,0.5,3");
        let config = config_for(&file);

        let mut connector = MockConnector::new();
        connector.expect_connect().times(0);

        let uploader = CwopUploader::with_connector(connector, config.server.clone());
        match run_cycle(&config, &uploader).await {
            Err(CwopError::InvalidRecord(msg)) => assert!(msg.contains("humidity")),
            other => panic!("Expected InvalidRecord, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreadable_log_skips_upload() {
        let file = write_table("");
        let mut config = config_for(&file);
        config.datalog.path = "/nonexistent/Mesonet.dat".to_string();

        let mut connector = MockConnector::new();
        connector.expect_connect().times(0);

        let uploader = CwopUploader::with_connector(connector, config.server.clone());
        let result = run_cycle(&config, &uploader).await;
        assert!(matches!(result, Err(CwopError::DataLog(_))));
    }
}
