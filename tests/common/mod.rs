//! Scripted in-process stand-in for the YOU API, served by `tiny_http`.

use serde_json::{json, Value};
use std::collections::HashMap;
use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread;

use tiny_http::{Header, Request, Response, Server};

use you_api_tester::utils::config::Config;

const TOKEN: &str = "token-abc";

/// Knobs that bend the backend away from the happy path
#[derive(Debug, Clone)]
pub struct Behavior {
    pub quiz_questions: usize,
    pub fail_goal_creation: bool,
    /// Put payloads next to `success` instead of under `data`
    pub top_level: bool,
    pub reject_registration: bool,
    pub omit_login_token: bool,
    /// Hand out a token that every authenticated route then refuses
    pub issue_rejected_token: bool,
    /// Accept requests but never answer them
    pub stall_responses: bool,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            quiz_questions: 3,
            fail_goal_creation: false,
            top_level: false,
            reject_registration: false,
            omit_login_token: false,
            issue_rejected_token: false,
            stall_responses: false,
        }
    }
}

/// Running backend; shuts down on drop
pub struct FakeApi {
    server: Arc<Server>,
    handle: Option<thread::JoinHandle<()>>,
    requests: Arc<Mutex<Vec<String>>>,
    pub base_url: String,
}

impl FakeApi {
    pub fn start(behavior: Behavior) -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
        let addr = server.server_addr().to_ip().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let handle = {
            let server = Arc::clone(&server);
            let requests = Arc::clone(&requests);
            thread::spawn(move || {
                let stall = behavior.stall_responses;
                let mut backend = Backend::new(behavior);
                // Unanswered requests are held until shutdown; dropping one would reply 500
                let mut stalled = Vec::new();
                for request in server.incoming_requests() {
                    requests
                        .lock()
                        .unwrap()
                        .push(format!("{} {}", request.method().as_str(), request.url()));
                    if stall {
                        stalled.push(request);
                    } else {
                        backend.handle(request);
                    }
                }
            })
        };

        Self {
            server,
            handle: Some(handle),
            requests,
            base_url: format!("http://{addr}/api"),
        }
    }

    pub fn config(&self) -> Config {
        Config {
            base_url: self.base_url.clone(),
            timeout_ms: 5_000,
            ..Config::default()
        }
    }

    /// Every request received so far, as `METHOD /path`
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn received(&self, request: &str) -> bool {
        self.requests().iter().any(|r| r == request)
    }
}

impl Drop for FakeApi {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

struct Backend {
    behavior: Behavior,
    users: HashMap<String, String>,
    messages: Vec<Value>,
    goal: Option<Value>,
}

impl Backend {
    fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            users: HashMap::new(),
            messages: Vec::new(),
            goal: None,
        }
    }

    fn handle(&mut self, mut request: Request) {
        let mut raw = String::new();
        let _ = request.as_reader().read_to_string(&mut raw);
        let body: Value = serde_json::from_str(&raw).unwrap_or(Value::Null);

        let authorized = request
            .headers()
            .iter()
            .find(|h| h.field.equiv("Authorization"))
            .map_or(false, |h| h.value.as_str() == format!("Bearer {TOKEN}"));

        let method = request.method().as_str().to_string();
        let path = request.url().split('?').next().unwrap_or("").to_string();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let (status, reply) = self.route(&method, &segments, &body, authorized);

        let content_type = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
        let response = Response::from_string(reply.to_string())
            .with_status_code(status)
            .with_header(content_type);
        let _ = request.respond(response);
    }

    fn ok(&self, payload: Value) -> Value {
        if self.behavior.top_level {
            let mut envelope = json!({ "success": true });
            if let (Some(target), Value::Object(fields)) = (envelope.as_object_mut(), payload) {
                target.extend(fields);
            }
            envelope
        } else {
            json!({ "success": true, "data": payload })
        }
    }

    fn route(&mut self, method: &str, segments: &[&str], body: &Value, authorized: bool) -> (u16, Value) {
        let fail = |status: u16, message: &str| (status, json!({ "success": false, "message": message }));

        match (method, segments) {
            ("GET", ["health"]) => (200, json!({ "success": true, "message": "OK" })),
            ("GET", ["api"]) => (200, json!({ "message": "YOU API", "version": "1.0.0" })),

            ("POST", ["api", "auth", "register"]) => {
                if self.behavior.reject_registration {
                    return fail(500, "Registration unavailable");
                }
                let email = body["email"].as_str().unwrap_or_default().to_string();
                if self.users.contains_key(&email) {
                    return fail(400, "User already exists");
                }
                let password = body["password"].as_str().unwrap_or_default().to_string();
                self.users.insert(email.clone(), password);
                (201, self.ok(json!({ "user": { "_id": "u1", "name": body["name"], "email": email } })))
            }
            ("POST", ["api", "auth", "login"]) => {
                let email = body["email"].as_str().unwrap_or_default();
                let password = body["password"].as_str().unwrap_or_default();
                if self.users.get(email).map(String::as_str) != Some(password) {
                    return fail(401, "Invalid credentials");
                }
                let user = json!({ "_id": "u1", "email": email });
                if self.behavior.omit_login_token {
                    (200, self.ok(json!({ "user": user })))
                } else if self.behavior.issue_rejected_token {
                    (200, self.ok(json!({ "user": user, "token": "token-expired" })))
                } else {
                    (200, self.ok(json!({ "user": user, "token": TOKEN })))
                }
            }

            _ if segments.first() == Some(&"api") && !authorized => fail(401, "Access token required"),

            ("GET", ["api", "auth", "me"]) => {
                (200, self.ok(json!({ "user": { "_id": "u1", "name": "Maria Silva" } })))
            }
            ("POST", ["api", "auth", "logout"]) => (200, json!({ "success": true })),

            ("GET", ["api", "user", "profile"]) => {
                (200, self.ok(json!({ "profile": { "bio": "", "interests": [] } })))
            }
            ("GET", ["api", "user", "settings"]) => (200, self.ok(json!({ "settings": {} }))),
            ("GET", ["api", "user", "stats"]) => (200, self.ok(json!({ "stats": { "goals": 0 } }))),
            ("PUT", ["api", "user", "profile" | "settings"]) => (200, json!({ "success": true })),

            ("GET", ["api", "chat", "conversations"]) => {
                (200, self.ok(json!({ "conversations": [] })))
            }
            ("POST", ["api", "chat", "conversations"]) => {
                (201, self.ok(json!({ "conversation": { "_id": "c1", "title": body["title"] } })))
            }
            ("POST", ["api", "chat", "conversations", "c1", "messages"]) => {
                let sent = json!({ "type": "user", "content": body["content"] });
                let reply = json!({ "type": "ai", "content": "Start with small daily habits." });
                self.messages.push(sent.clone());
                self.messages.push(reply.clone());
                (201, self.ok(json!({ "messages": [sent, reply] })))
            }
            ("GET", ["api", "chat", "conversations", "c1", "messages"]) => {
                (200, self.ok(json!({ "messages": self.messages })))
            }

            ("GET", ["api", "goals"]) => (200, self.ok(json!({ "goals": [] }))),
            ("POST", ["api", "goals"]) => {
                if self.behavior.fail_goal_creation {
                    return fail(500, "Goal storage unavailable");
                }
                let goal = json!({
                    "_id": "g1",
                    "title": body["title"],
                    "description": body["description"],
                    "progress": 0,
                    "progressHistory": []
                });
                self.goal = Some(goal.clone());
                (201, self.ok(json!({ "goal": goal })))
            }
            (_, ["api", "goals", "g1", ..]) if self.goal.is_none() => fail(404, "Goal not found"),
            ("PUT", ["api", "goals", "g1"]) => {
                if let Some(goal) = self.goal.as_mut() {
                    goal["description"] = body["description"].clone();
                }
                (200, json!({ "success": true }))
            }
            ("POST", ["api", "goals", "g1", "progress"]) => {
                if let Some(goal) = self.goal.as_mut() {
                    goal["progress"] = body["progress"].clone();
                    if let Some(history) = goal["progressHistory"].as_array_mut() {
                        history.push(json!({ "progress": body["progress"], "note": body["note"] }));
                    }
                }
                (200, json!({ "success": true }))
            }
            ("GET", ["api", "goals", "g1"]) => {
                let goal = self.goal.clone().unwrap_or(Value::Null);
                (200, self.ok(json!({ "goal": goal })))
            }

            ("GET", ["api", "quiz", "questions"]) => {
                let questions: Vec<Value> = (0..self.behavior.quiz_questions)
                    .map(|i| json!({ "id": format!("q{}", i + 1), "question": "Do you plan ahead?" }))
                    .collect();
                (200, self.ok(json!({ "questions": questions })))
            }
            ("POST", ["api", "quiz", "submit"]) => (200, json!({ "success": true })),

            ("GET", ["api", "analytics", "dashboard" | "patterns"]) => (200, self.ok(json!({}))),
            ("POST", ["api", "analytics", "mood"]) => (201, json!({ "success": true })),

            ("POST", ["api", "support", "contact"]) => (201, json!({ "success": true })),
            ("GET", ["api", "support", "faq"]) => {
                (200, self.ok(json!({ "faq": [{ "q": "a" }, { "q": "b" }, { "q": "c" }] })))
            }

            _ => fail(404, "Not found"),
        }
    }
}
