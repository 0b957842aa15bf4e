use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use serde::Deserialize;
use tokio::process::Command;

const NOT_FOUND: u16 = 404;

/// HTTP client using curl for making Pivotal Tracker API requests
pub struct TrackerCurlClient {
    token: String,
}

#[derive(Debug, Deserialize)]
struct TrackerError {
    error: String,
    #[serde(default)]
    general_problem: Option<String>,
}

impl TrackerCurlClient {
    pub fn new(token: String) -> Self {
        Self { token }
    }

    /// Make a GET request with url-encoded query parameters.
    /// Returns `None` when the resource does not exist.
    pub async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Option<String>> {
        let mut args = vec![
            "-s".to_string(),
            "-w".to_string(),
            "\n%{http_code}".to_string(),
            "-H".to_string(),
            format!("X-TrackerToken: {}", self.token),
            "-H".to_string(),
            "Accept: application/json".to_string(),
            "-H".to_string(),
            "User-Agent: git-storyid".to_string(),
        ];
        if !query.is_empty() {
            args.push("-G".to_string());
            for (key, value) in query {
                args.push("--data-urlencode".to_string());
                args.push(format!("{key}={value}"));
            }
        }
        args.push(url.to_string());

        let output = Command::new("curl")
            .args(&args)
            .output()
            .await
            .context("Failed to execute curl command")?;

        if !output.status.success() {
            bail!(
                "curl command failed: {}",
                String::from_utf8_lossy(&output.stderr)
            );
        }

        parse_response(output.stdout)
    }
}

/// Parse curl response with status code appended
fn parse_response(stdout: Vec<u8>) -> Result<Option<String>> {
    let output_str = String::from_utf8(stdout)?;
    let (response, code) = output_str.rsplit_once('\n').unwrap_or(("", output_str.as_str()));
    let response = response.to_string();
    let status_code = code
        .trim()
        .parse::<u16>()
        .with_context(|| format!("Tracker API response has no HTTP status: {:?}", code))?;

    if status_code == NOT_FOUND {
        return Ok(None);
    }
    if status_code >= 400 {
        // Try to parse error message from response
        if let Ok(error) = serde_json::from_str::<TrackerError>(&response) {
            match error.general_problem {
                Some(problem) => bail!("Tracker API error: {} ({})", error.error, problem),
                None => bail!("Tracker API error: {}", error.error),
            }
        }
        bail!(
            "Tracker API request failed with status {}: {}",
            status_code,
            response
        );
    }

    Ok(Some(response))
}
