use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

use super::catalog::{Advance, FileCatalog};
use super::codec;
use super::data::{SessionView, TagState};
use super::vocabulary::{color_at, TagVocabulary};
use crate::metadata::{GatewayError, MetadataGateway};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("invalid tag name {0:?}: tags cannot be empty or contain ';'")]
    InvalidTagName(String),
}

/// Everything the session mutates, guarded as one unit
#[derive(Debug)]
struct SessionState {
    catalog: FileCatalog,
    vocabulary: TagVocabulary,
}

/// The tagging session: which file is current and which tags exist.
///
/// All methods take `&self` and may be called from several threads. The
/// state lock is only held for in-memory work, never across an exiftool round
/// trip. Toggles additionally hold `edit` for their whole read-modify-write
/// cycle so two toggles never interleave on the same file.
pub struct SessionController {
    state: Mutex<SessionState>,
    edit: Mutex<()>,
    gateway: Arc<dyn MetadataGateway>,
}

impl SessionController {
    pub fn new(catalog: FileCatalog, gateway: Arc<dyn MetadataGateway>) -> Self {
        Self {
            state: Mutex::new(SessionState {
                catalog,
                vocabulary: TagVocabulary::new(),
            }),
            edit: Mutex::new(()),
            gateway,
        }
    }

    /// Current file and, for every known tag, whether the file carries it.
    ///
    /// Tags found on the file that the vocabulary has not seen yet are
    /// registered on the way.
    pub fn view_state(&self) -> Result<SessionView, SessionError> {
        let file = self.lock().catalog.current().clone();
        let raw = self.gateway.read_keywords_or_empty(&file.path)?;
        let decoded = codec::decode(&raw);

        let mut state = self.lock();
        for name in &decoded {
            if state.vocabulary.add(name) {
                tracing::debug!("🏷️  Discovered tag {name:?} on {}", file.file_name());
            }
        }

        let tags = state
            .vocabulary
            .all()
            .iter()
            .enumerate()
            .map(|(index, name)| TagState {
                name: name.clone(),
                color: color_at(index),
                checked: decoded.contains(&name.as_str()),
            })
            .collect();

        Ok(SessionView {
            file,
            total: state.catalog.len(),
            tags,
        })
    }

    /// Move to the next file
    pub fn advance(&self) -> Advance {
        let mut state = self.lock();
        let advance = state.catalog.advance();
        tracing::debug!("➡️  Now at {}", state.catalog.current().path.display());
        advance
    }

    /// Add or remove `name` on the current file.
    ///
    /// Returns whether the file carries the tag afterwards. The vocabulary is
    /// left alone; only `register_tag` grows it.
    pub fn toggle_tag(&self, name: &str) -> Result<bool, SessionError> {
        if name.is_empty() {
            return Err(SessionError::InvalidTagName(name.to_string()));
        }
        validate_name(name)?;

        let _edit = self.edit.lock().unwrap_or_else(PoisonError::into_inner);
        let path = self.lock().catalog.current().path.clone();

        let raw = self.gateway.read_keywords_or_empty(&path)?;
        let updated = codec::toggle(&raw, name);
        self.gateway.write_keywords(&path, &updated)?;

        let checked = codec::contains(&updated, name);
        tracing::info!(
            "🏷️  {} {name:?} on {}",
            if checked { "Added" } else { "Removed" },
            path.display()
        );
        Ok(checked)
    }

    /// Make `name` available for tagging without assigning it.
    ///
    /// Empty names are ignored. Returns true if the tag is new.
    pub fn register_tag(&self, name: &str) -> Result<bool, SessionError> {
        validate_name(name)?;

        let added = self.lock().vocabulary.add(name);
        if added {
            tracing::info!("🆕 Registered tag {name:?}");
        }
        Ok(added)
    }

    /// Known tag names in vocabulary order
    #[cfg(test)]
    pub fn vocabulary(&self) -> Vec<String> {
        self.lock().vocabulary.all().to_vec()
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The keyword string has no escaping, so the delimiter cannot appear in a name
fn validate_name(name: &str) -> Result<(), SessionError> {
    if name.contains(codec::DELIMITER) {
        return Err(SessionError::InvalidTagName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::memory::MemoryGateway;
    use std::path::PathBuf;
    use std::thread;

    fn session(files: &[&str], gateway: Arc<MemoryGateway>) -> SessionController {
        let catalog = FileCatalog::from_paths(files.iter().map(PathBuf::from).collect()).unwrap();
        SessionController::new(catalog, gateway)
    }

    fn membership(view: &SessionView) -> Vec<(&str, bool)> {
        view.tags
            .iter()
            .map(|tag| (tag.name.as_str(), tag.checked))
            .collect()
    }

    #[test]
    fn test_register_toggle_advance() {
        let gateway = Arc::new(MemoryGateway::new());
        let session = session(&["a.jpg", "b.jpg"], gateway.clone());

        assert!(session.register_tag("red").unwrap());
        assert!(session.toggle_tag("red").unwrap());

        let view = session.view_state().unwrap();
        assert_eq!(view.file.path, PathBuf::from("a.jpg"));
        assert_eq!(membership(&view), vec![("red", true)]);

        assert_eq!(session.advance(), Advance::Moved(1));
        let view = session.view_state().unwrap();
        assert_eq!(view.file.path, PathBuf::from("b.jpg"));
        assert_eq!(membership(&view), vec![("red", false)]);

        assert_eq!(gateway.stored("a.jpg").as_deref(), Some("red"));
        assert_eq!(gateway.stored("b.jpg"), None);
    }

    #[test]
    fn test_view_discovers_tags_from_keywords() {
        let gateway = Arc::new(
            MemoryGateway::new()
                .with_keywords("a.jpg", "sky;sea")
                .with_keywords("b.jpg", "sea;forest"),
        );
        let session = session(&["a.jpg", "b.jpg"], gateway);

        let view = session.view_state().unwrap();
        assert_eq!(membership(&view), vec![("sky", true), ("sea", true)]);
        assert_eq!(view.total, 2);

        session.advance();
        let view = session.view_state().unwrap();
        assert_eq!(
            membership(&view),
            vec![("sky", false), ("sea", true), ("forest", true)]
        );
        assert_eq!(view.tags[2].color, color_at(2));
    }

    #[test]
    fn test_missing_keywords_read_as_empty() {
        let session = session(&["a.jpg"], Arc::new(MemoryGateway::new()));
        let view = session.view_state().unwrap();
        assert!(view.tags.is_empty());
    }

    #[test]
    fn test_toggle_does_not_register() {
        let gateway = Arc::new(MemoryGateway::new());
        let session = session(&["a.jpg"], gateway.clone());

        assert!(session.toggle_tag("ghost").unwrap());
        assert!(session.vocabulary().is_empty());
        assert_eq!(gateway.stored("a.jpg").as_deref(), Some("ghost"));

        // Shows up once the file is viewed, since it is now in its keywords
        let view = session.view_state().unwrap();
        assert_eq!(view.is_checked("ghost"), Some(true));
    }

    #[test]
    fn test_toggle_twice_restores_keywords() {
        let gateway = Arc::new(MemoryGateway::new().with_keywords("a.jpg", "dog;bird"));
        let session = session(&["a.jpg"], gateway.clone());

        assert!(session.toggle_tag("cat").unwrap());
        assert_eq!(gateway.stored("a.jpg").as_deref(), Some("dog;bird;cat"));
        assert!(!session.toggle_tag("cat").unwrap());
        assert_eq!(gateway.stored("a.jpg").as_deref(), Some("dog;bird"));
    }

    #[test]
    fn test_register_tag_rules() {
        let session = session(&["a.jpg"], Arc::new(MemoryGateway::new()));

        assert!(!session.register_tag("").unwrap());
        assert!(session.register_tag("red").unwrap());
        assert!(!session.register_tag("red").unwrap());
        assert!(matches!(
            session.register_tag("red;blue"),
            Err(SessionError::InvalidTagName(_))
        ));
        assert!(matches!(
            session.toggle_tag("red;blue"),
            Err(SessionError::InvalidTagName(_))
        ));
        assert_eq!(session.vocabulary(), vec!["red".to_string()]);
    }

    #[test]
    fn test_gateway_failures_are_recoverable() {
        let gateway = Arc::new(MemoryGateway::new().with_keywords("a.jpg", "red"));
        let session = session(&["a.jpg"], gateway.clone());

        gateway.set_fail_reads(true);
        assert!(matches!(
            session.view_state(),
            Err(SessionError::Gateway(GatewayError::Tool(_)))
        ));
        assert!(session.toggle_tag("red").is_err());

        gateway.set_fail_reads(false);
        gateway.set_fail_writes(true);
        assert!(session.toggle_tag("red").is_err());
        assert_eq!(gateway.stored("a.jpg").as_deref(), Some("red"));

        // The session keeps working once the gateway recovers
        gateway.set_fail_writes(false);
        let view = session.view_state().unwrap();
        assert_eq!(membership(&view), vec![("red", true)]);
    }

    #[test]
    fn test_concurrent_toggles_are_not_lost() {
        let gateway = Arc::new(MemoryGateway::new());
        let session = session(&["a.jpg"], gateway.clone());
        let names: Vec<String> = (0..16).map(|i| format!("tag{i}")).collect();

        thread::scope(|scope| {
            for name in &names {
                let session = &session;
                scope.spawn(move || session.toggle_tag(name).unwrap());
            }
        });

        let stored = gateway.stored("a.jpg").unwrap();
        let mut decoded = codec::decode(&stored);
        decoded.sort_unstable();
        let mut expected: Vec<&str> = names.iter().map(String::as_str).collect();
        expected.sort_unstable();
        assert_eq!(decoded, expected);
    }
}
