use anyhow::Result;
use log::{debug, info};
use serde_json::Value;
use std::time::Instant;
use uuid::Uuid;

use super::error::{CheckFailure, CheckOutcome};
use super::fixtures::{self, TestUser};
use super::session::SessionState;
use super::state::{ResultLog, TestResult, TestSummary};
use crate::api::envelope;
use crate::client::{ApiClient, ApiResponse};
use crate::report::console;
use crate::utils::config::Config;

/// Runs the fixed check sequence against one API and records a verdict per check
pub struct ApiTester {
    client: ApiClient,
    session: SessionState,
    log: ResultLog,
    user: TestUser,
}

fn require_ok(resp: &ApiResponse) -> Result<(), CheckFailure> {
    if resp.success {
        Ok(())
    } else {
        Err(CheckFailure::from_response(resp))
    }
}

/// Success status and `"success": true` in the envelope
fn require_envelope(resp: &ApiResponse) -> Result<(), CheckFailure> {
    require_ok(resp)?;
    if envelope::is_success(&resp.body) {
        Ok(())
    } else {
        Err(CheckFailure::from_response(resp))
    }
}

fn require_object(resp: &ApiResponse) -> Result<(), CheckFailure> {
    require_ok(resp)?;
    if resp.body.is_object() {
        Ok(())
    } else {
        Err(CheckFailure::shape(resp, "expected a JSON object"))
    }
}

/// Whether `sent` appears within `received`, in order
fn contains_in_order(received: &[&str], sent: &[String]) -> bool {
    let mut remaining = received.iter();
    sent.iter()
        .all(|message| remaining.any(|candidate| *candidate == message))
}

impl ApiTester {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_user(config, TestUser::unique())
    }

    pub fn with_user(config: &Config, user: TestUser) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(&config.base_url, config.timeout())?,
            session: SessionState::new(),
            log: ResultLog::new(&Uuid::new_v4().to_string()),
            user,
        })
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn log(&self) -> &ResultLog {
        &self.log
    }

    pub fn results(&self) -> &[TestResult] {
        self.log.results()
    }

    pub fn user(&self) -> &TestUser {
        &self.user
    }

    /// Run every check in dependency order and print the summary
    pub fn run_all(&mut self) -> TestSummary {
        console::print_banner(self.client.base_url(), &self.user.email);

        self.check_health();
        self.check_api_root();

        if self.register() {
            self.check_duplicate_registration();
            self.check_unauthenticated_access();

            if self.login() {
                self.run_authenticated();
            } else {
                info!("Login failed, skipping authenticated checks");
            }
        } else {
            info!("Registration failed, skipping login");
        }

        if self.session.authenticated {
            self.logout();
        }

        self.log.finish();
        let summary = self.log.summary();
        console::print_summary(&summary, self.log.results());
        summary
    }

    fn run_authenticated(&mut self) {
        self.session.authenticated = true;

        self.get_current_user();
        self.get_profile();
        self.update_profile();
        self.get_settings();
        self.update_settings();
        self.get_stats();

        self.get_conversations();
        if self.create_conversation() {
            self.send_message();
            self.get_messages();
        } else {
            info!("Conversation not created, skipping message checks");
        }

        self.get_goals();
        if self.create_goal() {
            self.update_goal();
            self.update_goal_progress();
            self.verify_goal();
        } else {
            info!("Goal not created, skipping goal update checks");
        }

        if self.get_quiz_questions() {
            self.submit_quiz();
        } else {
            info!("Quiz questions not retrieved, skipping quiz submission");
        }

        self.get_dashboard();
        self.log_mood();
        self.get_behavior_patterns();

        self.send_contact_message();
        self.get_faq();
    }

    /// Record one result and print its status line
    pub fn record(&mut self, name: &str, outcome: CheckOutcome, duration_ms: u64) -> bool {
        let result = TestResult::from_outcome(name, &outcome, duration_ms);
        let response = outcome.as_ref().err().and_then(CheckFailure::response);
        console::print_result(&result, response);
        self.log.record(result).success
    }

    fn run_check(&mut self, name: &str, check: fn(&mut Self) -> CheckOutcome) -> bool {
        let started = Instant::now();
        let outcome = check(self);
        self.record(name, outcome, started.elapsed().as_millis() as u64)
    }

    fn send(&self, method: &str, path: &str, body: Option<&Value>) -> ApiResponse {
        self.client
            .request(method, path, body, None, self.session.token())
    }

    fn send_anonymous(&self, method: &str, path: &str, body: Option<&Value>) -> ApiResponse {
        self.client.request(method, path, body, None, None)
    }

    // Connectivity

    pub fn check_health(&mut self) -> bool {
        self.run_check("Health Check", |t| {
            let resp = t.send("GET", "/../health", None);
            require_envelope(&resp)?;
            Ok(format!(
                "Status: {}",
                envelope::message(&resp.body).unwrap_or("OK")
            ))
        })
    }

    pub fn check_api_root(&mut self) -> bool {
        self.run_check("API Root", |t| {
            let resp = t.send("GET", "/", None);
            require_object(&resp)?;
            let info = envelope::api_info(&resp.body)?;
            let version = info.version.map_or_else(|| "N/A".to_string(), |v| v.to_string());
            Ok(format!("Version: {}", version))
        })
    }

    // Authentication

    pub fn register(&mut self) -> bool {
        self.run_check("User Registration", |t| {
            let resp = t.send_anonymous("POST", "/auth/register", Some(&t.user.registration()));
            require_envelope(&resp)?;
            let user_id = envelope::user_id(&resp.body)?;
            debug!("Registered user {}", user_id);
            t.session.user_id = Some(user_id.clone());
            Ok(format!("User ID: {}", user_id))
        })
    }

    pub fn check_duplicate_registration(&mut self) -> bool {
        self.run_check("Duplicate Registration Rejected", |t| {
            let resp = t.send_anonymous("POST", "/auth/register", Some(&t.user.registration()));
            if resp.is_network_failure() {
                return Err(CheckFailure::from_response(&resp));
            }
            if resp.success {
                return Err(CheckFailure::shape(&resp, "duplicate email was accepted"));
            }
            Ok(format!("Rejected with status {}", resp.status))
        })
    }

    pub fn check_unauthenticated_access(&mut self) -> bool {
        self.run_check("Unauthenticated Access Rejected", |t| {
            let resp = t.send_anonymous("GET", "/auth/me", None);
            match resp.status {
                0 => Err(CheckFailure::from_response(&resp)),
                401 | 403 => Ok(format!("Rejected with status {}", resp.status)),
                _ => Err(CheckFailure::shape(&resp, "expected 401 or 403 without a token")),
            }
        })
    }

    pub fn login(&mut self) -> bool {
        self.run_check("User Login", |t| {
            let resp = t.send_anonymous("POST", "/auth/login", Some(&t.user.credentials()));
            require_envelope(&resp)?;
            let token = envelope::token(&resp.body)?;
            debug!("Bearer token received");
            t.session.token = Some(token);
            Ok(format!("Token received: {}", t.session.has_token()))
        })
    }

    pub fn get_current_user(&mut self) -> bool {
        self.run_check("Get Current User", |t| {
            let resp = t.send("GET", "/auth/me", None);
            require_envelope(&resp)?;
            let name = envelope::user(&resp.body).ok().and_then(|u| u.name);
            Ok(format!("User: {}", name.as_deref().unwrap_or("N/A")))
        })
    }

    pub fn logout(&mut self) -> bool {
        self.run_check("User Logout", |t| {
            let resp = t.send("POST", "/auth/logout", None);
            require_ok(&resp)?;
            t.session.clear_token();
            Ok("Logout successful".to_string())
        })
    }

    // User management

    pub fn get_profile(&mut self) -> bool {
        self.run_check("Get User Profile", |t| {
            let resp = t.send("GET", "/user/profile", None);
            require_object(&resp)?;
            let loaded = envelope::locate(&resp.body, "profile")
                .or_else(|| resp.body.json())
                .map_or(false, |p| p.as_object().map_or(false, |o| !o.is_empty()));
            Ok(format!("Profile loaded: {}", loaded))
        })
    }

    pub fn update_profile(&mut self) -> bool {
        self.run_check("Update User Profile", |t| {
            let resp = t.send("PUT", "/user/profile", Some(&fixtures::profile_update()));
            require_ok(&resp)?;
            Ok("Profile updated successfully".to_string())
        })
    }

    pub fn get_settings(&mut self) -> bool {
        self.run_check("Get User Settings", |t| {
            require_ok(&t.send("GET", "/user/settings", None))?;
            Ok("Settings retrieved".to_string())
        })
    }

    pub fn update_settings(&mut self) -> bool {
        self.run_check("Update User Settings", |t| {
            let resp = t.send("PUT", "/user/settings", Some(&fixtures::settings_update()));
            require_ok(&resp)?;
            Ok("Settings updated".to_string())
        })
    }

    pub fn get_stats(&mut self) -> bool {
        self.run_check("Get User Stats", |t| {
            require_ok(&t.send("GET", "/user/stats", None))?;
            Ok("Stats retrieved".to_string())
        })
    }

    // Chat

    pub fn get_conversations(&mut self) -> bool {
        self.run_check("Get Conversations", |t| {
            let resp = t.send("GET", "/chat/conversations", None);
            require_ok(&resp)?;
            Ok(format!(
                "Found {} conversations",
                envelope::count(&resp.body, "conversations")
            ))
        })
    }

    pub fn create_conversation(&mut self) -> bool {
        self.run_check("Create Conversation", |t| {
            let resp = t.send("POST", "/chat/conversations", Some(&fixtures::new_conversation()));
            require_ok(&resp)?;
            let id = envelope::conversation_id(&resp.body)?;
            debug!("Conversation {} created", id);
            t.session.conversation_id = Some(id.clone());
            Ok(format!("Conversation ID: {}", id))
        })
    }

    pub fn send_message(&mut self) -> bool {
        self.run_check("Send Message", |t| {
            let id = t
                .session
                .conversation_id
                .clone()
                .ok_or_else(|| CheckFailure::Precondition("No conversation ID available".into()))?;

            let path = format!("/chat/conversations/{}/messages", id);
            let resp = t.send("POST", &path, Some(&fixtures::chat_message()));
            require_ok(&resp)?;
            t.session.sent_messages.push(fixtures::CHAT_MESSAGE.to_string());

            let returned = envelope::messages(&resp.body).unwrap_or_default();
            let replied = returned.iter().any(|m| !m.is_from_user());
            Ok(format!(
                "Message sent, {} returned{}",
                returned.len(),
                if replied { " including AI response" } else { "" }
            ))
        })
    }

    pub fn get_messages(&mut self) -> bool {
        self.run_check("Get Messages", |t| {
            let id = t
                .session
                .conversation_id
                .clone()
                .ok_or_else(|| CheckFailure::Precondition("No conversation ID available".into()))?;

            let resp = t.send("GET", &format!("/chat/conversations/{}/messages", id), None);
            require_ok(&resp)?;
            let messages = envelope::messages(&resp.body)?;

            let from_user: Vec<&str> = messages
                .iter()
                .filter(|m| m.is_from_user())
                .map(|m| m.text())
                .collect();
            if !contains_in_order(&from_user, &t.session.sent_messages) {
                return Err(CheckFailure::shape(
                    &resp,
                    "sent messages missing or out of order",
                ));
            }
            Ok(format!("Retrieved {} messages", messages.len()))
        })
    }

    // Goals

    pub fn get_goals(&mut self) -> bool {
        self.run_check("Get Goals", |t| {
            let resp = t.send("GET", "/goals", None);
            require_ok(&resp)?;
            Ok(format!("Found {} goals", envelope::count(&resp.body, "goals")))
        })
    }

    pub fn create_goal(&mut self) -> bool {
        self.run_check("Create Goal", |t| {
            let resp = t.send("POST", "/goals", Some(&fixtures::new_goal()));
            require_ok(&resp)?;
            let id = envelope::goal_id(&resp.body)?;
            debug!("Goal {} created", id);
            t.session.goal_id = Some(id.clone());
            Ok(format!("Goal ID: {}", id))
        })
    }

    fn goal_id(&self) -> Result<String, CheckFailure> {
        self.session
            .goal_id
            .clone()
            .ok_or_else(|| CheckFailure::Precondition("No goal ID available".into()))
    }

    pub fn update_goal(&mut self) -> bool {
        self.run_check("Update Goal", |t| {
            let id = t.goal_id()?;
            let resp = t.send("PUT", &format!("/goals/{}", id), Some(&fixtures::goal_update()));
            require_ok(&resp)?;
            Ok("Goal updated successfully".to_string())
        })
    }

    pub fn update_goal_progress(&mut self) -> bool {
        self.run_check("Update Goal Progress", |t| {
            let id = t.goal_id()?;
            let path = format!("/goals/{}/progress", id);
            let resp = t.send("POST", &path, Some(&fixtures::goal_progress()));
            require_ok(&resp)?;
            Ok("Progress updated successfully".to_string())
        })
    }

    pub fn verify_goal(&mut self) -> bool {
        self.run_check("Verify Goal", |t| {
            let id = t.goal_id()?;
            let resp = t.send("GET", &format!("/goals/{}", id), None);
            require_ok(&resp)?;
            let goal = envelope::goal(&resp.body)?;

            if goal.description.as_deref() != Some(fixtures::UPDATED_GOAL_DESCRIPTION) {
                return Err(CheckFailure::shape(&resp, "description was not updated"));
            }
            let progress = f64::from(fixtures::GOAL_PROGRESS);
            if !goal.has_progress(progress) {
                return Err(CheckFailure::shape(
                    &resp,
                    format!("no progress entry of {}", fixtures::GOAL_PROGRESS),
                ));
            }
            Ok(format!(
                "Description updated, progress {} recorded",
                fixtures::GOAL_PROGRESS
            ))
        })
    }

    // Quiz

    pub fn get_quiz_questions(&mut self) -> bool {
        self.run_check("Get Quiz Questions", |t| {
            let resp = t.send("GET", "/quiz/questions", None);
            require_object(&resp)?;
            let questions = envelope::quiz_questions(&resp.body)?;
            let count = questions.len();
            t.session.quiz_questions = questions;
            Ok(format!("Retrieved {} questions", count))
        })
    }

    pub fn submit_quiz(&mut self) -> bool {
        self.run_check("Submit Quiz", |t| {
            if t.session.quiz_questions.is_empty() {
                return Err(CheckFailure::Precondition(
                    "No quiz questions available".into(),
                ));
            }

            let submission = fixtures::quiz_submission(&t.session.quiz_questions);
            let resp = t.send("POST", "/quiz/submit", Some(&submission));
            require_ok(&resp)?;
            let answered = t.session.quiz_questions.len().min(fixtures::MAX_QUIZ_ANSWERS);
            Ok(format!("Quiz submitted with {} answers", answered))
        })
    }

    // Analytics

    pub fn get_dashboard(&mut self) -> bool {
        self.run_check("Get Dashboard Data", |t| {
            require_ok(&t.send("GET", "/analytics/dashboard", None))?;
            Ok("Dashboard data retrieved".to_string())
        })
    }

    pub fn log_mood(&mut self) -> bool {
        self.run_check("Log Mood", |t| {
            require_ok(&t.send("POST", "/analytics/mood", Some(&fixtures::mood_entry())))?;
            Ok("Mood logged successfully".to_string())
        })
    }

    pub fn get_behavior_patterns(&mut self) -> bool {
        self.run_check("Get Behavior Patterns", |t| {
            require_ok(&t.send("GET", "/analytics/patterns", None))?;
            Ok("Patterns retrieved".to_string())
        })
    }

    // Support

    pub fn send_contact_message(&mut self) -> bool {
        self.run_check("Send Contact Message", |t| {
            let body = fixtures::contact_message(&t.user);
            require_ok(&t.send("POST", "/support/contact", Some(&body)))?;
            Ok("Contact message sent".to_string())
        })
    }

    pub fn get_faq(&mut self) -> bool {
        self.run_check("Get FAQ", |t| {
            let resp = t.send("GET", "/support/faq", None);
            require_ok(&resp)?;
            Ok(format!(
                "Retrieved {} FAQ items",
                envelope::count(&resp.body, "faq")
            ))
        })
    }
}
