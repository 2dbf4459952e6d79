use crate::error::SimplifyError;
use crate::preferences::Preferences;
use crate::report::Summary;
use crate::selector::Selector;
use crate::simplify::Transcript;
use anyhow::{Context, Result};
use minijinja::{context, Environment};
use std::fs;
use std::io;
use std::path::{self, Path};

/// Read a whole file, turning "not found" into [`SimplifyError::InputNotFound`].
fn read_input(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(contents),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(SimplifyError::InputNotFound(path.to_path_buf()).into())
        }
        Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (path::absolute(a), path::absolute(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// One configured simplification run.
pub struct Session {
    pub prefs: Preferences,
    noise: Vec<Selector>,
}

impl Session {
    /// Load preferences (when a file is given) and validate them.
    pub fn open(config: Option<&Path>) -> Result<Self> {
        let prefs = match config {
            Some(path) => Preferences::load(path)?,
            None => Preferences::default(),
        };
        Self::with_preferences(prefs)
    }

    pub fn with_preferences(prefs: Preferences) -> Result<Self> {
        let noise = prefs.noise_selectors()?;
        Ok(Self { prefs, noise })
    }

    /// Simplify `input` into `output`. Nothing is written unless the whole
    /// pass succeeds.
    pub fn simplify(&self, input: &Path, output: &Path) -> Result<Summary> {
        tracing::info!("Processing: {}", input.display());
        let html = read_input(input)?;
        if same_file(input, output) {
            return Err(SimplifyError::SameInputAndOutput(output.to_path_buf()).into());
        }
        let mut transcript = Transcript::parse(&html)
            .with_context(|| format!("simplifying {}", input.display()))?;
        tracing::info!("Found {} conversation items.", transcript.turns().len());

        let attachments = transcript.summary().attachments;
        if attachments > 0 && self.prefs.warn_on_attachments {
            tracing::warn!(
                attachments,
                "attachments and files referenced by the transcript will not be archived"
            );
        }

        transcript.clean(&self.noise);
        let summary = transcript.summary().clone();

        let title = match self.prefs.title.as_deref() {
            Some(template) => Some(self.render_title(template, input, &summary)?),
            None => None,
        };
        let document = transcript.into_html(title.as_deref());

        fs::write(output, document).with_context(|| format!("writing {}", output.display()))?;
        tracing::info!(?summary, "Successfully created simplified file: {}", output.display());
        Ok(summary)
    }

    fn render_title(&self, template: &str, input: &Path, summary: &Summary) -> Result<String> {
        let source = input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let env = Environment::new();
        let tmpl = env
            .template_from_str(template)
            .context("parsing title template")?;
        tmpl.render(context! {
            source,
            turns => summary.turns(),
            user_turns => summary.user_turns,
            model_turns => summary.model_turns,
        })
        .context("rendering title template")
    }
}
