use crate::record::{impl_course_scoped, text, timestamp};
use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Flat record of a course module.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ModuleRecord {
    pub id: u64,
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
    pub unlock_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<u64>,
}

impl ModuleRecord {
    /// Maps a module object. `published` is only reported to sessions that may see
    /// unpublished content; when absent it stays out of the record.
    pub fn from_json(module: &Value) -> Option<ModuleRecord> {
        Some(ModuleRecord {
            id: module["id"].as_u64()?,
            name: text(&module["name"]),
            published: module["published"].as_bool(),
            unlock_at: timestamp(&module["unlock_at"]),
            course_id: None,
        })
    }
}

/// Kind of a module item, carrying the link field that only that kind has.
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleItemKind {
    Quiz { url: Option<String> },
    ExternalUrl { external_url: Option<String> },
    /// Any other item type (`Page`, `File`, `Assignment`, `SubHeader`, ...).
    Other(String),
}

impl ModuleItemKind {
    fn from_item(item: &Value) -> ModuleItemKind {
        match item["type"].as_str().unwrap_or_default() {
            "Quiz" => ModuleItemKind::Quiz {
                url: text(&item["url"]),
            },
            "ExternalUrl" => ModuleItemKind::ExternalUrl {
                external_url: text(&item["external_url"]),
            },
            other => ModuleItemKind::Other(other.to_string()),
        }
    }

    /// The Canvas `type` string of this kind.
    pub fn type_name(&self) -> &str {
        match self {
            ModuleItemKind::Quiz { .. } => "Quiz",
            ModuleItemKind::ExternalUrl { .. } => "ExternalUrl",
            ModuleItemKind::Other(name) => name.as_str(),
        }
    }
}

/// Flat record of one item inside a module.
///
/// Flattened fields: `module_id`, `module_name`, `id`, `title`, `type`, then `html_url`
/// when present, `url` for quizzes, `external_url` for external links, `published` when
/// present, and `course_id` once tagged.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleItemRecord {
    pub module_id: u64,
    pub module_name: Option<String>,
    pub id: u64,
    pub title: Option<String>,
    pub kind: ModuleItemKind,
    pub html_url: Option<String>,
    pub published: Option<bool>,
    pub course_id: Option<u64>,
}

impl ModuleItemRecord {
    /// Maps an item object listed under `module`.
    pub fn from_json(module: &ModuleRecord, item: &Value) -> Option<ModuleItemRecord> {
        Some(ModuleItemRecord {
            module_id: module.id,
            module_name: module.name.clone(),
            id: item["id"].as_u64()?,
            title: text(&item["title"]),
            kind: ModuleItemKind::from_item(item),
            html_url: text(&item["html_url"]),
            published: item.get("published").and_then(Value::as_bool),
            course_id: None,
        })
    }

    pub fn type_name(&self) -> &str {
        self.kind.type_name()
    }

    /// The link a reader would follow: the Canvas page for quizzes, the target for
    /// external links.
    fn link(&self) -> Option<&str> {
        match &self.kind {
            ModuleItemKind::Quiz { .. } => self.html_url.as_deref(),
            ModuleItemKind::ExternalUrl { external_url } => external_url.as_deref(),
            ModuleItemKind::Other(_) => None,
        }
    }
}

impl Serialize for ModuleItemRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("module_id", &self.module_id)?;
        map.serialize_entry("module_name", &self.module_name)?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("title", &self.title)?;
        map.serialize_entry("type", self.type_name())?;
        if let Some(html_url) = &self.html_url {
            map.serialize_entry("html_url", html_url)?;
        }
        match &self.kind {
            ModuleItemKind::Quiz { url } => map.serialize_entry("url", url)?,
            ModuleItemKind::ExternalUrl { external_url } => {
                map.serialize_entry("external_url", external_url)?
            }
            ModuleItemKind::Other(_) => {}
        }
        if let Some(published) = self.published {
            map.serialize_entry("published", &published)?;
        }
        if let Some(course_id) = self.course_id {
            map.serialize_entry("course_id", &course_id)?;
        }
        map.end()
    }
}

impl_course_scoped!(ModuleRecord, ModuleItemRecord);

/// Finds the link of the first module item whose title starts with `title_prefix` and
/// whose type is `type_name`.
///
/// Quizzes resolve to their Canvas page (`html_url`), external links to their target
/// (`external_url`); other item types never match.
pub fn matching_module_url<'a>(
    items: impl IntoIterator<Item = &'a ModuleItemRecord>,
    title_prefix: &str,
    type_name: &str,
) -> Option<String> {
    items
        .into_iter()
        .filter(|item| {
            item.title
                .as_deref()
                .is_some_and(|title| title.starts_with(title_prefix))
        })
        .find(|item| item.type_name() == type_name)
        .and_then(|item| item.link())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::to_row;
    use serde_json::json;

    fn module() -> ModuleRecord {
        ModuleRecord::from_json(&json!({"id": 3, "name": "Week 1", "unlock_at": null})).unwrap()
    }

    fn items() -> Vec<ModuleItemRecord> {
        [
            json!({"id": 1, "title": "1.1 Reading", "type": "Page",
                   "html_url": "https://c.example/courses/1/modules/items/1", "published": true}),
            json!({"id": 2, "title": "1.2 Check-in", "type": "Quiz",
                   "html_url": "https://c.example/courses/1/modules/items/2",
                   "url": "https://c.example/api/v1/courses/1/quizzes/77"}),
            json!({"id": 3, "title": "1.3 Lecture video", "type": "ExternalUrl",
                   "external_url": "https://video.example/lecture-1"}),
        ]
        .iter()
        .filter_map(|item| ModuleItemRecord::from_json(&module(), item))
        .collect()
    }

    #[test]
    fn test_module_published_omitted_when_absent() {
        let row = to_row(&module());
        assert!(!row.contains_key("published"));

        let published =
            ModuleRecord::from_json(&json!({"id": 4, "name": "Week 2", "published": false}))
                .unwrap();
        assert_eq!(to_row(&published)["published"], json!(false));
    }

    #[test]
    fn test_item_fields_depend_on_type() {
        let rows: Vec<_> = items().iter().map(to_row).collect();

        let page = &rows[0];
        assert!(!page.contains_key("url"));
        assert!(!page.contains_key("external_url"));
        assert_eq!(page["published"], json!(true));

        let quiz = &rows[1];
        assert_eq!(quiz["type"], json!("Quiz"));
        assert_eq!(quiz["url"], json!("https://c.example/api/v1/courses/1/quizzes/77"));
        assert!(!quiz.contains_key("external_url"));
        assert!(!quiz.contains_key("published"));

        let link = &rows[2];
        assert_eq!(link["external_url"], json!("https://video.example/lecture-1"));
        assert!(!link.contains_key("url"));
        assert!(!link.contains_key("html_url"));
        assert_eq!(link["module_name"], json!("Week 1"));
    }

    #[test]
    fn test_non_boolean_published_is_ignored() {
        let item = json!({"id": 5, "title": "x", "type": "File", "published": "yes"});
        let record = ModuleItemRecord::from_json(&module(), &item).unwrap();
        assert_eq!(record.published, None);
    }

    #[test]
    fn test_matching_module_url() {
        let items = items();
        assert_eq!(
            matching_module_url(&items, "1.2", "Quiz").as_deref(),
            Some("https://c.example/courses/1/modules/items/2")
        );
        assert_eq!(
            matching_module_url(&items, "1.3", "ExternalUrl").as_deref(),
            Some("https://video.example/lecture-1")
        );
        assert_eq!(matching_module_url(&items, "1.1", "Quiz"), None);
        assert_eq!(matching_module_url(&items, "2.", "Quiz"), None);
    }
}
