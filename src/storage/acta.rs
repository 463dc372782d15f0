use crate::managers::minutes::Acta;
use anyhow::Result;
use std::fs;
use std::path::PathBuf;

/// Explicit export of actas to disk. The in-memory collection stays the
/// source of truth; exporting is a user action, not implicit persistence.
pub struct ActaStorage {
    base_path: PathBuf,
}

impl ActaStorage {
    /// Create a new ActaStorage
    ///
    /// # Arguments
    /// * `base_path` - Base directory for exported actas (e.g., ~/Vecinal/actas/)
    pub fn new(base_path: PathBuf) -> Result<Self> {
        // Create base directory if it doesn't exist with secure permissions
        if !base_path.exists() {
            #[cfg(unix)]
            {
                use std::os::unix::fs::DirBuilderExt;
                std::fs::DirBuilder::new()
                    .mode(0o700) // User-only access
                    .recursive(true)
                    .create(&base_path)?;
            }
            #[cfg(not(unix))]
            {
                fs::create_dir_all(&base_path)?;
            }
            log::info!("Created acta export directory: {}", base_path.display());
        }

        Ok(Self { base_path })
    }

    /// Get the default export path in the user's home directory
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
        Ok(home.join("Vecinal").join("actas"))
    }

    /// Create a new instance with the default path
    pub fn with_default_path() -> Result<Self> {
        Self::new(Self::default_path()?)
    }

    /// Generate a directory name for an acta
    ///
    /// Format: YYYY-MM-DD_acta-title
    fn generate_acta_dir_name(acta: &Acta) -> String {
        // Comprehensive sanitization to prevent path traversal
        let sanitized_title: String = acta
            .title
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-' || *c == '_')
            .collect::<String>()
            .replace(' ', "-")
            .to_lowercase();

        let sanitized_title = if sanitized_title.is_empty() {
            "sin-titulo".to_string()
        } else {
            sanitized_title.chars().take(100).collect()
        };

        let sanitized_title = sanitized_title.replace("..", "");

        format!("{}_{}", acta.date, sanitized_title)
    }

    fn get_acta_dir(&self, acta: &Acta) -> PathBuf {
        self.base_path.join(Self::generate_acta_dir_name(acta))
    }

    /// Export an acta as acta.json + acta.md
    pub fn save_acta(&self, acta: &Acta) -> Result<PathBuf> {
        let acta_dir = self.get_acta_dir(acta);

        if !acta_dir.exists() {
            #[cfg(unix)]
            {
                use std::os::unix::fs::DirBuilderExt;
                std::fs::DirBuilder::new()
                    .mode(0o700)
                    .recursive(true)
                    .create(&acta_dir)?;
            }
            #[cfg(not(unix))]
            {
                fs::create_dir_all(&acta_dir)?;
            }
        }

        let json_path = acta_dir.join("acta.json");
        let json = serde_json::to_string_pretty(acta)?;
        fs::write(&json_path, json)?;

        let markdown_path = acta_dir.join("acta.md");
        fs::write(&markdown_path, Self::generate_markdown(acta))?;

        log::info!("Exported acta to: {}", acta_dir.display());

        Ok(acta_dir)
    }

    /// Render an acta as Markdown
    fn generate_markdown(acta: &Acta) -> String {
        let mut markdown = String::new();

        markdown.push_str(&format!("# {}\n\n", acta.title));
        markdown.push_str(&format!("**Fecha**: {}\n", acta.date));
        markdown.push_str(&format!("**Redactada por**: {}\n\n", acta.created_by));
        markdown.push_str("---\n\n");

        markdown.push_str("## Resumen ejecutivo\n\n");
        markdown.push_str(&format!("{}\n\n", acta.executive_summary));

        markdown.push_str("## Acuerdos\n\n");
        for (i, agreement) in acta.agreements.iter().enumerate() {
            markdown.push_str(&format!("{}. {}\n", i + 1, agreement));
        }
        markdown.push('\n');

        markdown.push_str("## Transcripción\n\n");
        markdown.push_str(&format!("{}\n", acta.transcript));

        if let (Some(signed_by), Some(signed_at)) = (&acta.signed_by, &acta.signed_at) {
            markdown.push_str(&format!("\n---\n\nFirmada por {} el {}\n", signed_by, signed_at));
        }

        markdown
    }

    /// Load an exported acta back from disk
    pub fn load_acta(&self, acta_dir_name: &str) -> Result<Acta> {
        let acta_dir = self.base_path.join(acta_dir_name);

        if !acta_dir.exists() {
            return Err(anyhow::anyhow!(
                "Acta directory not found: {}",
                acta_dir.display()
            ));
        }

        let json_path = acta_dir.join("acta.json");
        let content = fs::read_to_string(&json_path)?;
        let acta: Acta = serde_json::from_str(&content)?;

        Ok(acta)
    }

    /// List all exported acta directories, most recent first
    pub fn list_actas(&self) -> Result<Vec<String>> {
        if !self.base_path.exists() {
            return Ok(Vec::new());
        }

        let mut actas = Vec::new();

        for entry in fs::read_dir(&self.base_path)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_dir() {
                if let Some(name) = path.file_name() {
                    actas.push(name.to_string_lossy().to_string());
                }
            }
        }

        actas.sort();
        actas.reverse(); // Most recent first

        Ok(actas)
    }

    /// Delete an exported acta
    pub fn delete_acta(&self, acta_dir_name: &str) -> Result<()> {
        let acta_dir = self.base_path.join(acta_dir_name);

        if acta_dir.exists() {
            fs::remove_dir_all(&acta_dir)?;
            log::info!("Deleted exported acta: {}", acta_dir.display());
        }

        Ok(())
    }
}
