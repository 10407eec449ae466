use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Visibility of a test case.
/// SAMPLE cases are shown to students; HIDDEN cases are used for final grading only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestCaseKind {
    Sample,
    Hidden,
}

impl Default for TestCaseKind {
    fn default() -> Self {
        TestCaseKind::Sample
    }
}

impl fmt::Display for TestCaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestCaseKind::Sample => write!(f, "SAMPLE"),
            TestCaseKind::Hidden => write!(f, "HIDDEN"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    /// Unique within a problem. Locally authored cases get a generated id.
    #[serde(default = "generate_id")]
    pub id: String,
    pub input: String,
    pub expected_output: String,
    #[serde(rename = "type", default)]
    pub kind: TestCaseKind,
}

fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl TestCase {
    pub fn new(id: impl Into<String>, input: &str, expected_output: &str, kind: TestCaseKind) -> Self {
        Self {
            id: id.into(),
            input: input.to_string(),
            expected_output: expected_output.to_string(),
            kind,
        }
    }

    pub fn is_sample(&self) -> bool {
        self.kind == TestCaseKind::Sample
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DifficultyLevel {
    Easy,
    Medium,
    Hard,
}

impl Default for DifficultyLevel {
    fn default() -> Self {
        DifficultyLevel::Easy
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifficultyLevel::Easy => write!(f, "EASY"),
            DifficultyLevel::Medium => write!(f, "MEDIUM"),
            DifficultyLevel::Hard => write!(f, "HARD"),
        }
    }
}

impl DifficultyLevel {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "EASY" => Some(DifficultyLevel::Easy),
            "MEDIUM" => Some(DifficultyLevel::Medium),
            "HARD" => Some(DifficultyLevel::Hard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub statement: String,
    #[serde(default)]
    pub difficulty_level: DifficultyLevel,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
    #[serde(default)]
    pub contest_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Problem {
    /// Sample cases in their original order
    pub fn sample_tests(&self) -> Vec<TestCase> {
        self.test_cases.iter().filter(|tc| tc.is_sample()).cloned().collect()
    }

    /// Hidden cases in their original order
    pub fn hidden_tests(&self) -> Vec<TestCase> {
        self.test_cases.iter().filter(|tc| !tc.is_sample()).cloned().collect()
    }
}

/// Validation failures raised before a create request leaves the client
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in title and statement")]
    MissingTitleOrStatement,
    #[error("Please add at least one test case")]
    NoTestCases,
    #[error("Contest name cannot be empty")]
    MissingContestName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTestCase {
    pub input: String,
    pub expected_output: String,
    #[serde(rename = "type")]
    pub kind: TestCaseKind,
}

impl From<&TestCase> for NewTestCase {
    fn from(tc: &TestCase) -> Self {
        Self {
            input: tc.input.clone(),
            expected_output: tc.expected_output.clone(),
            kind: tc.kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProblem {
    pub title: String,
    pub statement: String,
    pub difficulty_level: DifficultyLevel,
    pub test_cases: Vec<NewTestCase>,
}

impl NewProblem {
    /// Check the authoring rules and return the payload with trimmed title and statement
    pub fn validated(self) -> Result<Self, ValidationError> {
        let title = self.title.trim().to_string();
        let statement = self.statement.trim().to_string();
        if title.is_empty() || statement.is_empty() {
            return Err(ValidationError::MissingTitleOrStatement);
        }
        if self.test_cases.is_empty() {
            return Err(ValidationError::NoTestCases);
        }
        Ok(Self {
            title,
            statement,
            ..self
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contest {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "enrollment_key")]
    pub enrollment_key: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContest {
    pub name: String,
    pub description: String,
    pub enrollment_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
}

impl NewContest {
    pub fn validated(self) -> Result<Self, ValidationError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::MissingContestName);
        }
        Ok(Self { name, ..self })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

/// Role as the client uses it: anyone who is not a student manages contests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocalRole {
    Student,
    Teacher,
}

impl Role {
    pub fn normalized(self) -> LocalRole {
        match self {
            Role::Student => LocalRole::Student,
            Role::Teacher | Role::Admin => LocalRole::Teacher,
        }
    }
}

impl fmt::Display for LocalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalRole::Student => write!(f, "student"),
            LocalRole::Teacher => write!(f, "teacher"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub email_verified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: String,
    pub student_name: String,
    #[serde(default)]
    pub total_score: f64,
    pub rank: u32,
    #[serde(default)]
    pub problems_solved: u32,
    #[serde(default)]
    pub last_submission_time: Option<String>,
}

fn default_total_pages() -> u32 {
    1
}

/// Paginated listing as returned inside the envelope's `data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default = "default_total_pages")]
    pub total_pages: u32,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Derived per-case verdict, never persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseResult {
    pub id: String,
    pub pass: bool,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[serde(rename = "javascript")]
    JavaScript,
    Python,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::JavaScript => write!(f, "javascript"),
            Language::Python => write!(f, "python"),
        }
    }
}

impl Language {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "javascript" | "js" => Some(Language::JavaScript),
            "python" | "py" => Some(Language::Python),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionType {
    Sample,
    Final,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedTestCase {
    pub input: String,
    pub expected_output: String,
}

/// Payload posted to the external grading endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub graded_result_id: String,
    pub student_id: String,
    pub submission_type: SubmissionType,
    pub language: Language,
    pub code: String,
    pub test_cases: Vec<SubmittedTestCase>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub results: Option<Vec<CaseResult>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_wire_format() {
        let tc: TestCase = serde_json::from_str(
            r#"{"id":"t1","input":"5","expectedOutput":"15","type":"HIDDEN"}"#,
        )
        .unwrap();
        assert_eq!(tc.id, "t1");
        assert_eq!(tc.expected_output, "15");
        assert_eq!(tc.kind, TestCaseKind::Hidden);
    }

    #[test]
    fn test_case_without_id_gets_one() {
        let a: TestCase = serde_json::from_str(r#"{"input":"1","expectedOutput":"2"}"#).unwrap();
        let b: TestCase = serde_json::from_str(r#"{"input":"1","expectedOutput":"2"}"#).unwrap();
        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
        assert_eq!(a.kind, TestCaseKind::Sample);
    }

    #[test]
    fn test_problem_partitions_keep_order() {
        let problem = Problem {
            id: "p".to_string(),
            title: "Add ten".to_string(),
            statement: String::new(),
            difficulty_level: DifficultyLevel::Easy,
            test_cases: vec![
                TestCase::new("a", "1", "11", TestCaseKind::Sample),
                TestCase::new("b", "2", "12", TestCaseKind::Hidden),
                TestCase::new("c", "3", "13", TestCaseKind::Sample),
                TestCase::new("d", "4", "14", TestCaseKind::Hidden),
            ],
            contest_id: None,
            created_at: None,
            updated_at: None,
        };

        let samples: Vec<_> = problem.sample_tests().into_iter().map(|t| t.id).collect();
        let hidden: Vec<_> = problem.hidden_tests().into_iter().map(|t| t.id).collect();
        assert_eq!(samples, vec!["a", "c"]);
        assert_eq!(hidden, vec!["b", "d"]);
    }

    #[test]
    fn test_new_problem_validation() {
        let case = NewTestCase {
            input: "1".to_string(),
            expected_output: "2".to_string(),
            kind: TestCaseKind::Sample,
        };

        let blank = NewProblem {
            title: "   ".to_string(),
            statement: "stmt".to_string(),
            difficulty_level: DifficultyLevel::Easy,
            test_cases: vec![case.clone()],
        };
        assert_eq!(blank.validated(), Err(ValidationError::MissingTitleOrStatement));

        let no_cases = NewProblem {
            title: "Title".to_string(),
            statement: "stmt".to_string(),
            difficulty_level: DifficultyLevel::Hard,
            test_cases: vec![],
        };
        assert_eq!(no_cases.validated(), Err(ValidationError::NoTestCases));

        let ok = NewProblem {
            title: "  Title ".to_string(),
            statement: " stmt\n".to_string(),
            difficulty_level: DifficultyLevel::Medium,
            test_cases: vec![case],
        }
        .validated()
        .unwrap();
        assert_eq!(ok.title, "Title");
        assert_eq!(ok.statement, "stmt");
    }

    #[test]
    fn test_new_problem_serializes_camel_case() {
        let payload = NewProblem {
            title: "T".to_string(),
            statement: "S".to_string(),
            difficulty_level: DifficultyLevel::Medium,
            test_cases: vec![NewTestCase {
                input: "in".to_string(),
                expected_output: "out".to_string(),
                kind: TestCaseKind::Hidden,
            }],
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["difficultyLevel"], "MEDIUM");
        assert_eq!(json["testCases"][0]["expectedOutput"], "out");
        assert_eq!(json["testCases"][0]["type"], "HIDDEN");
    }

    #[test]
    fn test_contest_accepts_snake_case_enrollment_key() {
        let contest: Contest =
            serde_json::from_str(r#"{"id":"c1","name":"Week 1","enrollment_key":"ABC123"}"#).unwrap();
        assert_eq!(contest.enrollment_key.as_deref(), Some("ABC123"));

        let contest: Contest =
            serde_json::from_str(r#"{"id":"c1","name":"Week 1","enrollmentKey":"XYZ"}"#).unwrap();
        assert_eq!(contest.enrollment_key.as_deref(), Some("XYZ"));
    }

    #[test]
    fn test_new_contest_requires_name() {
        let contest = NewContest {
            name: "  ".to_string(),
            description: String::new(),
            enrollment_key: String::new(),
            start_time: None,
            end_time: None,
        };
        assert_eq!(contest.validated(), Err(ValidationError::MissingContestName));
    }

    #[test]
    fn test_role_normalization() {
        assert_eq!(Role::Student.normalized(), LocalRole::Student);
        assert_eq!(Role::Teacher.normalized(), LocalRole::Teacher);
        assert_eq!(Role::Admin.normalized(), LocalRole::Teacher);
        assert_eq!(LocalRole::Student.to_string(), "student");
    }

    #[test]
    fn test_page_defaults() {
        let page: Page<LeaderboardEntry> = serde_json::from_str(r#"{"data":[]}"#).unwrap();
        assert_eq!(page.total_pages, 1);
        assert!(page.data.is_empty());
    }

    #[test]
    fn test_submission_payload_wire_format() {
        let payload = SubmissionPayload {
            graded_result_id: "g1".to_string(),
            student_id: "s1".to_string(),
            submission_type: SubmissionType::Sample,
            language: Language::JavaScript,
            code: "function solve(input){ return input; }".to_string(),
            test_cases: vec![SubmittedTestCase {
                input: "a".to_string(),
                expected_output: "a".to_string(),
            }],
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["gradedResultId"], "g1");
        assert_eq!(json["submissionType"], "sample");
        assert_eq!(json["language"], "javascript");
        assert_eq!(json["testCases"][0]["expectedOutput"], "a");
    }

    #[test]
    fn test_language_parsing() {
        assert_eq!(Language::from_str("JavaScript"), Some(Language::JavaScript));
        assert_eq!(Language::from_str("py"), Some(Language::Python));
        assert_eq!(Language::from_str("cobol"), None);
    }
}
