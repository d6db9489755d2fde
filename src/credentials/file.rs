use anyhow::{anyhow, Context as _, Result};
use std::path::Path;
use tokio::io::AsyncWriteExt as _;

use super::Credentials;

/// Returns Ok(None) if the credentials file doesn't exist yet
pub async fn load(path: &Path) -> Result<Option<Credentials>> {
    log::info!("Loading credentials...");
    if !tokio::fs::try_exists(path).await? {
        return Ok(None);
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| anyhow!("Failed to read {}", path.display()))?;
    let credentials: Credentials = serde_yaml::from_str(&content)
        .with_context(|| anyhow!("Failed to parse {}", path.display()))?;
    credentials
        .validate()
        .with_context(|| anyhow!("Invalid credentials in {}", path.display()))?;

    log::info!("Loading credentials...done");

    Ok(Some(credentials))
}

pub async fn save(credentials: &Credentials, path: &Path) -> Result<()> {
    log::info!("Saving credentials...");

    let content = serde_yaml::to_string(credentials)?;

    // First write to temporary file so we don't lose the credentials if writing fails halfway
    let filename = path
        .file_name()
        .ok_or_else(|| anyhow!("Path has no filename"))?
        .to_str()
        .ok_or_else(|| anyhow!("Filename isn't valid utf-8"))?;
    let tmppath = path.with_file_name(format!("{}.tmp", filename));
    write_private(&tmppath, content.as_bytes()).await?;

    // Ok, writing succeeded, let's now replace the real file with the tmpfile
    tokio::fs::rename(&tmppath, path).await?;

    log::info!("Saving credentials...done");

    Ok(())
}

/// Writes a new file only the current user can read, the credentials contain API tokens
async fn write_private(path: &Path, content: &[u8]) -> Result<()> {
    // A leftover file from an interrupted save would keep its old permissions
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(err.into()),
    }

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);
    let mut file = options
        .open(path)
        .await
        .with_context(|| anyhow!("Failed to create {}", path.display()))?;
    file.write_all(content).await?;
    file.sync_all().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::credentials::{
        AccessToken, AccountMapping, FireflyAccountId, FireflyAuth, FireflyTokenType,
        PowensAccountId, PowensAuth, PowensUserId,
    };

    use super::*;

    fn some_credentials_1() -> Credentials {
        let mut credentials = Credentials::new(
            PowensAuth {
                domain: "example-sandbox.biapi.pro".to_string(),
                client_id: "client-id-1".to_string(),
                user_id: PowensUserId(5),
                token: AccessToken::new("powens-token-1".to_string()),
            },
            FireflyAuth {
                url: "https://firefly.example.com".to_string(),
                token: AccessToken::new("firefly-token-1".to_string()),
                token_type: FireflyTokenType::BearerToken,
            },
        );
        credentials.mapping = [
            (PowensAccountId(11), FireflyAccountId(1)),
            (PowensAccountId(12), FireflyAccountId(2)),
        ]
        .into_iter()
        .collect();
        credentials
    }

    fn some_credentials_2() -> Credentials {
        Credentials::new(
            PowensAuth {
                domain: "other.biapi.pro".to_string(),
                client_id: "client-id-2".to_string(),
                user_id: PowensUserId(6),
                token: AccessToken::new("powens-token-2".to_string()),
            },
            FireflyAuth {
                url: "http://localhost:8080".to_string(),
                token: AccessToken::new("firefly-token-2".to_string()),
                token_type: FireflyTokenType::AccessToken,
            },
        )
    }

    #[tokio::test]
    async fn load_nonexisting() {
        let tempdir = tempfile::tempdir().unwrap();
        let tempfile = tempdir.path().join("credentials.yml");

        let loaded = load(&tempfile).await.unwrap();
        assert_eq!(None, loaded);
    }

    #[tokio::test]
    async fn save_new_file_and_load() {
        let tempdir = tempfile::tempdir().unwrap();
        let tempfile = tempdir.path().join("credentials.yml");

        let credentials = some_credentials_1();

        save(&credentials, &tempfile).await.unwrap();
        let loaded = load(&tempfile).await.unwrap();
        assert_eq!(credentials, loaded.unwrap());
        assert!(!tempdir.path().join("credentials.yml.tmp").exists());
    }

    #[tokio::test]
    async fn overwrite_existing_file_and_load() {
        let tempdir = tempfile::tempdir().unwrap();
        let tempfile = tempdir.path().join("credentials.yml");

        let credentials1 = some_credentials_1();
        let credentials2 = some_credentials_2();

        save(&credentials1, &tempfile).await.unwrap();
        save(&credentials2, &tempfile).await.unwrap();
        let loaded = load(&tempfile).await.unwrap().unwrap();
        assert_ne!(credentials1, loaded);
        assert_eq!(credentials2, loaded);
    }

    #[tokio::test]
    async fn load_handwritten_file() {
        let tempdir = tempfile::tempdir().unwrap();
        let tempfile = tempdir.path().join("credentials.yml");
        tokio::fs::write(
            &tempfile,
            r#"
firefly:
  token: firefly-token-1
  token_type: BearerToken
  url: https://firefly.example.com
mapping:
  11: 1
  12: 2
powens:
  client_id: client-id-1
  domain: example-sandbox.biapi.pro
  token: powens-token-1
  user_id: 5
"#,
        )
        .await
        .unwrap();

        let loaded = load(&tempfile).await.unwrap().unwrap();
        assert_eq!(some_credentials_1(), loaded);
    }

    #[tokio::test]
    async fn load_file_without_mapping() {
        let tempdir = tempfile::tempdir().unwrap();
        let tempfile = tempdir.path().join("credentials.yml");
        tokio::fs::write(
            &tempfile,
            r#"
firefly:
  token: firefly-token-2
  token_type: AccessToken
  url: http://localhost:8080
powens:
  client_id: client-id-2
  domain: other.biapi.pro
  token: powens-token-2
  user_id: 6
"#,
        )
        .await
        .unwrap();

        let loaded = load(&tempfile).await.unwrap().unwrap();
        assert_eq!(AccountMapping::new_empty(), loaded.mapping);
        assert_eq!(some_credentials_2(), loaded);
    }

    #[tokio::test]
    async fn doesnt_load_invalid_firefly_url() {
        let tempdir = tempfile::tempdir().unwrap();
        let tempfile = tempdir.path().join("credentials.yml");

        let mut credentials = some_credentials_1();
        credentials.firefly.url = "ftp://firefly.example.com".to_string();
        save(&credentials, &tempfile).await.unwrap();

        let error = load(&tempfile).await.unwrap_err();
        assert!(
            format!("{error:#}").contains("must start with http:// or https://"),
            "{error:#}"
        );
    }

    #[tokio::test]
    async fn doesnt_load_empty_powens_token() {
        let tempdir = tempfile::tempdir().unwrap();
        let tempfile = tempdir.path().join("credentials.yml");

        let mut credentials = some_credentials_1();
        credentials.powens.token = AccessToken::new("".to_string());
        save(&credentials, &tempfile).await.unwrap();

        let error = load(&tempfile).await.unwrap_err();
        assert!(
            format!("{error:#}").contains("Powens token is empty"),
            "{error:#}"
        );
    }

    #[tokio::test]
    async fn doesnt_load_duplicate_mapping() {
        let tempdir = tempfile::tempdir().unwrap();
        let tempfile = tempdir.path().join("credentials.yml");
        tokio::fs::write(
            &tempfile,
            r#"
firefly:
  token: firefly-token-1
  token_type: BearerToken
  url: https://firefly.example.com
mapping:
  11: 1
  11: 2
powens:
  client_id: client-id-1
  domain: example-sandbox.biapi.pro
  token: powens-token-1
  user_id: 5
"#,
        )
        .await
        .unwrap();

        assert!(load(&tempfile).await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn saved_file_is_only_readable_by_owner() {
        use std::os::unix::fs::PermissionsExt as _;

        let tempdir = tempfile::tempdir().unwrap();
        let tempfile = tempdir.path().join("credentials.yml");

        save(&some_credentials_1(), &tempfile).await.unwrap();
        // Overwriting keeps the restricted permissions
        save(&some_credentials_2(), &tempfile).await.unwrap();

        let mode = std::fs::metadata(&tempfile).unwrap().permissions().mode();
        assert_eq!(0o600, mode & 0o777);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn leftover_tmp_file_is_replaced() {
        use std::os::unix::fs::PermissionsExt as _;

        let tempdir = tempfile::tempdir().unwrap();
        let tempfile = tempdir.path().join("credentials.yml");
        let tmpfile = tempdir.path().join("credentials.yml.tmp");
        std::fs::write(&tmpfile, "garbage").unwrap();
        std::fs::set_permissions(&tmpfile, std::fs::Permissions::from_mode(0o644)).unwrap();

        save(&some_credentials_1(), &tempfile).await.unwrap();

        assert_eq!(some_credentials_1(), load(&tempfile).await.unwrap().unwrap());
        let mode = std::fs::metadata(&tempfile).unwrap().permissions().mode();
        assert_eq!(0o600, mode & 0o777);
    }
}
