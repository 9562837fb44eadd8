use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub Uuid);

impl TaskId {
    /// Generate a fresh collision-resistant id.
    pub fn new() -> Self {
        TaskId(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim())
            .map(TaskId)
            .map_err(|_| DomainError::InvalidId(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Default for Priority {
    fn default() -> Self {
        Self::High
    }
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(DomainError::InvalidPriority(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Work,
    Personal,
    Shopping,
    Health,
    Finance,
    Ideas,
}

impl Default for Category {
    fn default() -> Self {
        Self::Work
    }
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Work => "Work",
            Self::Personal => "Personal",
            Self::Shopping => "Shopping",
            Self::Health => "Health",
            Self::Finance => "Finance",
            Self::Ideas => "Ideas",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "work" => Ok(Self::Work),
            "personal" => Ok(Self::Personal),
            "shopping" => Ok(Self::Shopping),
            "health" => Ok(Self::Health),
            "finance" => Ok(Self::Finance),
            "ideas" => Ok(Self::Ideas),
            _ => Err(DomainError::InvalidCategory(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a new incomplete task. Returns `None` when the trimmed
    /// text is empty; stored text is always trimmed.
    pub fn new(text: &str, meta: TaskMeta) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            id: TaskId::new(),
            text: text.to_string(),
            completed: false,
            created_at: Utc::now(),
            completed_at: None,
            priority: meta.priority.unwrap_or_default(),
            category: meta.category.unwrap_or_default(),
            due_date: meta.due_date,
        })
    }

    /// Business rule: determine if task is overdue
    pub fn is_overdue(&self) -> bool {
        self.due_date
            .map(|due| due < Utc::now() && !self.completed)
            .unwrap_or(false)
    }

    /// Business rule: due date falls on the current calendar day
    /// (time of day ignored).
    pub fn is_due_today(&self) -> bool {
        self.due_date
            .map(|due| due.date_naive() == Utc::now().date_naive())
            .unwrap_or(false)
    }

    /// Case-insensitive substring match against the task text.
    pub fn matches_search(&self, query: &str) -> bool {
        self.text.to_lowercase().contains(&query.to_lowercase())
    }
}

/// Optional metadata supplied at creation; unset fields take defaults.
#[derive(Debug, Clone, Default)]
pub struct TaskMeta {
    pub priority: Option<Priority>,
    pub category: Option<Category>,
    pub due_date: Option<DateTime<Utc>>,
}

/// The active predicate narrowing which tasks are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
    High,
    Today,
    Category(Category),
}

impl Filter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Completed => task.completed,
            Self::High => task.priority == Priority::High,
            Self::Today => task.is_due_today(),
            Self::Category(category) => task.category == category,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
            Self::High => write!(f, "high"),
            Self::Today => write!(f, "today"),
            Self::Category(category) => write!(f, "{category}"),
        }
    }
}

impl FromStr for Filter {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "high" => Ok(Self::High),
            "today" => Ok(Self::Today),
            other => Category::from_str(other)
                .map(Self::Category)
                .map_err(|_| DomainError::InvalidFilter(value.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_task_trims_text() {
        let task = Task::new("  Buy milk  ", TaskMeta::default()).unwrap();
        assert_eq!(task.text, "Buy milk");
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.category, Category::Work);
    }

    #[test]
    fn test_new_task_rejects_blank_text() {
        assert!(Task::new("", TaskMeta::default()).is_none());
        assert!(Task::new("   ", TaskMeta::default()).is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Task::new("A", TaskMeta::default()).unwrap();
        let b = Task::new("A", TaskMeta::default()).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_overdue_requires_incomplete() {
        let mut task = Task::new("Pay rent", TaskMeta::default()).unwrap();
        task.due_date = Some(Utc::now() - Duration::days(2));
        assert!(task.is_overdue());

        task.completed = true;
        task.completed_at = Some(Utc::now());
        assert!(!task.is_overdue());
    }

    #[test]
    fn test_due_today_ignores_time_of_day() {
        let mut task = Task::new("Standup", TaskMeta::default()).unwrap();
        let today = Utc::now().date_naive();
        task.due_date = today.and_hms_opt(23, 59, 0).map(|dt| dt.and_utc());
        assert!(task.is_due_today());

        task.due_date = Some(Utc::now() + Duration::days(1));
        assert!(!task.is_due_today());
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let task = Task::new("Buy Milk", TaskMeta::default()).unwrap();
        assert!(task.matches_search("milk"));
        assert!(task.matches_search("BUY"));
        assert!(!task.matches_search("bread"));
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!(Filter::from_str("all").unwrap(), Filter::All);
        assert_eq!(Filter::from_str("Active").unwrap(), Filter::Active);
        assert_eq!(
            Filter::from_str("shopping").unwrap(),
            Filter::Category(Category::Shopping)
        );
        assert!(Filter::from_str("bogus").is_err());
    }

    #[test]
    fn test_task_serializes_with_camel_case_field_names() {
        let mut task = Task::new("Buy milk", TaskMeta::default()).unwrap();
        task.due_date = Some(Utc::now());
        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("dueDate").is_some());
        assert_eq!(json["priority"], "High");
        assert_eq!(json["category"], "Work");
    }

    #[test]
    fn test_minimal_record_deserializes_with_defaults() {
        let json = format!(
            r#"{{"id":"{}","text":"Buy milk","createdAt":"2026-08-01T10:00:00Z"}}"#,
            Uuid::new_v4()
        );
        let task: Task = serde_json::from_str(&json).unwrap();
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.category, Category::Work);
        assert!(task.due_date.is_none());
    }
}
