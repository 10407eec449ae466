// Typed calls over the contest platform REST API
//
// Every method returns an ApiResponse (or, for the external submission
// endpoint, a SubmissionResponse); transport and server failures are values.
// Create calls validate their payload first and refuse to send invalid ones.

use crate::http::{ApiResponse, HttpClient, RequestOptions};
use crate::session::SessionStore;
use aigrade_common::config::ClientConfig;
use aigrade_common::envelope::unwrap_page;
use aigrade_common::types::{
    AuthPayload, Contest, LeaderboardEntry, NewContest, NewProblem, Page, Problem,
    RegisterRequest, SubmissionPayload, SubmissionResponse, User, ValidationError,
};
use hyper::Method;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    pub page: u32,
    pub size: u32,
    pub sort: String,
}

impl Default for ContestQuery {
    fn default() -> Self {
        Self {
            search: None,
            page: 0,
            size: 500,
            sort: "id,asc".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardQuery {
    pub contest_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    pub page: u32,
    pub size: u32,
    pub sort: String,
}

impl LeaderboardQuery {
    pub fn new(contest_id: impl Into<String>) -> Self {
        Self {
            contest_id: contest_id.into(),
            search: None,
            page: 0,
            size: 10,
            sort: "rank,asc".to_string(),
        }
    }
}

/// Trimmed search term, dropped when blank
fn clean_search(search: &Option<String>) -> Option<String> {
    search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn with_query<Q: Serialize>(path: &str, query: &Q) -> Result<String, String> {
    serde_urlencoded::to_string(query)
        .map(|qs| if qs.is_empty() { path.to_string() } else { format!("{}?{}", path, qs) })
        .map_err(|e| e.to_string())
}

#[derive(Clone)]
pub struct ApiClient {
    http: HttpClient,
    submissions_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: SessionStore) -> Self {
        Self {
            http: HttpClient::new(config.api_base.clone(), config.timeout, session),
            submissions_url: config.submissions_url.clone(),
        }
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn session(&self) -> &SessionStore {
        self.http.session()
    }

    // ---- auth ----

    /// Log in and, on success, begin the session
    pub async fn login(&self, email: &str, password: &str) -> ApiResponse<AuthPayload> {
        let response = self
            .http
            .post("/v1/auth/login", &json!({ "email": email, "password": password }))
            .await
            .decode_payload::<AuthPayload>();

        if !response.ok {
            return response;
        }

        match &response.data {
            Some(auth) => {
                info!(user_id = %auth.user.id, role = ?auth.user.role, "Logged in");
                if let Err(e) = self.session().begin(auth.token.clone(), auth.user.clone()) {
                    warn!(error = %e, "Failed to persist auth data");
                }
                response
            }
            None => ApiResponse::failure(response.status, "Empty response from login"),
        }
    }

    pub async fn register(&self, request: &RegisterRequest) -> ApiResponse<Value> {
        self.http.post("/v1/auth/register", request).await
    }

    pub async fn forgot_password(&self, email: &str) -> ApiResponse<Value> {
        self.http
            .post("/v1/auth/forgot-password", &json!({ "email": email }))
            .await
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> ApiResponse<Value> {
        self.http
            .post(
                "/v1/auth/reset-password",
                &json!({ "token": token, "newPassword": new_password }),
            )
            .await
    }

    pub async fn send_otp(&self, email: &str) -> ApiResponse<Value> {
        self.http.post("/v1/auth/send-otp", &json!({ "email": email })).await
    }

    pub async fn verify_email(&self, email: &str, otp_code: &str) -> ApiResponse<Value> {
        self.http
            .post(
                "/v1/auth/verify-email",
                &json!({ "email": email, "otpCode": otp_code }),
            )
            .await
    }

    /// Local only: the server keeps no session state to tear down
    pub fn logout(&self) {
        if let Err(e) = self.session().end() {
            warn!(error = %e, "Failed to clear persisted session");
        }
    }

    // ---- profile ----

    pub async fn profile(&self) -> ApiResponse<User> {
        self.http.get("/v1/user/profile").await.decode_payload()
    }

    /// Update names and refresh the cached user
    pub async fn update_profile(&self, first_name: &str, last_name: &str) -> ApiResponse<User> {
        let response: ApiResponse<User> = self
            .http
            .put(
                "/v1/user/profile",
                &json!({ "firstName": first_name, "lastName": last_name }),
            )
            .await
            .decode_payload();

        if let Some(user) = &response.data {
            if self.session().is_logged_in() {
                if let Err(e) = self.session().update_user(user.clone()) {
                    warn!(error = %e, "Failed to persist updated user");
                }
            }
        }
        response
    }

    // ---- contests ----

    pub async fn contests(&self, query: &ContestQuery) -> ApiResponse<Vec<Contest>> {
        let query = ContestQuery {
            search: clean_search(&query.search),
            ..query.clone()
        };
        match with_query("/v1/contests/all", &query) {
            Ok(path) => self.http.get(&path).await.decode_list(),
            Err(e) => ApiResponse::failure(0, e),
        }
    }

    pub async fn contest(&self, id: &str) -> ApiResponse<Contest> {
        self.http
            .get(&format!("/v1/contests/{}", id))
            .await
            .decode_payload()
    }

    pub async fn my_contests(&self) -> ApiResponse<Vec<Contest>> {
        self.http.get("/v1/contests/my-contests").await.decode_list()
    }

    /// Payload echoed by the server (shape varies, left as JSON)
    pub async fn create_contest(
        &self,
        contest: NewContest,
    ) -> Result<ApiResponse<Value>, ValidationError> {
        let contest = contest.validated()?;
        Ok(self.http.post("/v1/contests", &contest).await.payload())
    }

    pub async fn delete_contest(&self, id: &str) -> ApiResponse<Value> {
        match with_query("/v1/contests", &[("id", id)]) {
            Ok(path) => self.http.delete(&path).await,
            Err(e) => ApiResponse::failure(0, e),
        }
    }

    pub async fn enroll(&self, contest_id: &str, enrollment_key: &str) -> ApiResponse<Value> {
        self.http
            .post(
                "/v1/contests/enroll",
                &json!({ "contestId": contest_id, "enrollmentKey": enrollment_key }),
            )
            .await
    }

    pub async fn assign_problems(&self, contest_id: &str, problem_ids: &[String]) -> ApiResponse<Value> {
        self.http
            .post(
                "/v1/contests/assign-problems",
                &json!({ "contestId": contest_id, "problemIds": problem_ids }),
            )
            .await
    }

    pub async fn contest_problems(&self, contest_id: &str) -> ApiResponse<Vec<Problem>> {
        self.http
            .get(&format!("/v1/contests/problems/{}", contest_id))
            .await
            .decode_list()
    }

    // ---- problems ----

    pub async fn problems(&self) -> ApiResponse<Vec<Problem>> {
        self.http.get("/v1/problems").await.decode_list()
    }

    pub async fn all_problems(&self) -> ApiResponse<Vec<Problem>> {
        self.http.get("/v1/problems/all").await.decode_list()
    }

    pub async fn problem(&self, id: &str) -> ApiResponse<Problem> {
        self.http
            .get(&format!("/v1/problems/{}", id))
            .await
            .decode_payload()
    }

    pub async fn create_problem(
        &self,
        problem: NewProblem,
    ) -> Result<ApiResponse<Value>, ValidationError> {
        let problem = problem.validated()?;
        Ok(self.http.post("/v1/problems", &problem).await.payload())
    }

    pub async fn delete_problem(&self, id: &str) -> ApiResponse<Value> {
        self.http.delete(&format!("/v1/problems/{}", id)).await
    }

    // ---- leaderboard ----

    pub async fn leaderboard(&self, query: &LeaderboardQuery) -> ApiResponse<Page<LeaderboardEntry>> {
        let query = LeaderboardQuery {
            search: clean_search(&query.search),
            ..query.clone()
        };
        match with_query("/v1/leaderboard", &query) {
            Ok(path) => self.http.get(&path).await.decode_with(unwrap_page),
            Err(e) => ApiResponse::failure(0, e),
        }
    }

    // ---- submissions ----

    /// Post to the external grading endpoint (no session token is sent there)
    pub async fn submit(&self, payload: &SubmissionPayload) -> SubmissionResponse {
        let options = RequestOptions {
            skip_auth: true,
            ..RequestOptions::default()
        };
        let response = self
            .http
            .send_json(Method::POST, &self.submissions_url, payload, &options)
            .await;

        if !response.ok {
            let message = match response.status {
                0 => response.error.unwrap_or_else(|| "Failed to submit code".to_string()),
                status => format!(
                    "API error: {} {}",
                    status,
                    response.error.unwrap_or_default()
                ),
            };
            return SubmissionResponse {
                success: false,
                message,
                results: None,
            };
        }

        match response.data.map(serde_json::from_value::<SubmissionResponse>) {
            Some(Ok(parsed)) => parsed,
            Some(Err(e)) => SubmissionResponse {
                success: false,
                message: format!("Unexpected response shape: {}", e),
                results: None,
            },
            None => SubmissionResponse {
                success: false,
                message: "Empty response from submission endpoint".to_string(),
                results: None,
            },
        }
    }
}

/// Human-readable message from an envelope body, if it has one
pub fn envelope_message(body: &Value) -> Option<&str> {
    body.get("message").and_then(Value::as_str).filter(|m| !m.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contest_query_string() {
        let query = ContestQuery {
            search: Some("week 1".to_string()),
            ..ContestQuery::default()
        };
        assert_eq!(
            with_query("/v1/contests/all", &query).unwrap(),
            "/v1/contests/all?search=week+1&page=0&size=500&sort=id%2Casc"
        );
        assert_eq!(
            with_query("/v1/contests/all", &ContestQuery::default()).unwrap(),
            "/v1/contests/all?page=0&size=500&sort=id%2Casc"
        );
    }

    #[test]
    fn test_leaderboard_query_string() {
        let query = LeaderboardQuery::new("c-1");
        assert_eq!(
            with_query("/v1/leaderboard", &query).unwrap(),
            "/v1/leaderboard?contestId=c-1&page=0&size=10&sort=rank%2Casc"
        );
    }

    #[test]
    fn test_clean_search() {
        assert_eq!(clean_search(&Some("  ".to_string())), None);
        assert_eq!(clean_search(&Some(" algo ".to_string())), Some("algo".to_string()));
        assert_eq!(clean_search(&None), None);
    }

    #[test]
    fn test_delete_query_is_encoded() {
        assert_eq!(
            with_query("/v1/contests", &[("id", "a b")]).unwrap(),
            "/v1/contests?id=a+b"
        );
    }

    #[test]
    fn test_envelope_message() {
        assert_eq!(envelope_message(&json!({"message": "Sent"})), Some("Sent"));
        assert_eq!(envelope_message(&json!({"message": ""})), None);
        assert_eq!(envelope_message(&json!([])), None);
    }
}
