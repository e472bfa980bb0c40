//! Built-in visualization modules and their step catalogs

use crate::{Catalog, FaultMode, Step};

/// Closed set of visualizations shipped with the product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Module {
    /// HTTP request journey, DNS to response
    #[default]
    HttpRequest,
    /// Concurrency story around the event loop
    EventLoop,
    /// The areas a git change moves through
    GitAreas,
}

impl Module {
    pub const ALL: [Module; 3] = [Module::HttpRequest, Module::EventLoop, Module::GitAreas];

    /// Selects a module by identifier, falling back to the default for unknown ids
    pub fn select(id: &str) -> Module {
        let id = id.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.id().eq_ignore_ascii_case(id))
            .unwrap_or_default()
    }

    /// Like [`Module::select`], but reports whether the id was recognized
    pub fn lookup(id: &str) -> Option<Module> {
        let id = id.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.id().eq_ignore_ascii_case(id))
    }

    pub fn id(&self) -> &'static str {
        match self {
            Module::HttpRequest => "http-request",
            Module::EventLoop => "event-loop",
            Module::GitAreas => "git-areas",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Module::HttpRequest => "What happens when you load a URL",
            Module::EventLoop => "How the event loop schedules work",
            Module::GitAreas => "Where a git change lives",
        }
    }

    /// Builds this module's catalog
    pub fn catalog(&self) -> Catalog {
        let (steps, fault_modes) = match self {
            Module::HttpRequest => (http_request_steps(), http_request_faults()),
            Module::EventLoop => (event_loop_steps(), event_loop_faults()),
            Module::GitAreas => (git_areas_steps(), git_areas_faults()),
        };
        Catalog::new(steps, fault_modes).expect("built-in catalogs are valid")
    }
}

impl std::fmt::Display for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

fn http_request_steps() -> Vec<Step> {
    vec![
        Step::new("dns", "DNS lookup", 2000)
            .with_description("The resolver turns the hostname into an IP address"),
        Step::new("tcp", "TCP handshake", 2000)
            .with_description("SYN, SYN-ACK, ACK opens a connection to the server"),
        Step::new("tls", "TLS handshake", 2500)
            .with_description("Client and server agree on keys and verify the certificate"),
        Step::new("lb", "Load balancer", 1500)
            .with_description("The request is routed to a healthy application instance"),
        Step::new("app", "Application", 2500)
            .with_description("The handler parses the request and runs business logic"),
        Step::new("db", "Database", 2000)
            .with_description("The application queries the data it needs"),
        Step::new("response", "Response", 2000)
            .with_description("Bytes travel back and the browser renders the page"),
    ]
}

fn http_request_faults() -> Vec<FaultMode> {
    vec![
        FaultMode::new("dns-failure", "DNS failure"),
        FaultMode::new("tls-handshake", "TLS handshake error"),
        FaultMode::new("lb-overload", "Load balancer overloaded"),
        FaultMode::new("db-timeout", "Database timeout"),
    ]
}

fn event_loop_steps() -> Vec<Step> {
    vec![
        Step::new("call-stack", "Call stack", 2000)
            .with_description("Synchronous code runs to completion"),
        Step::new("web-apis", "Web APIs", 2000)
            .with_description("Timers and I/O are handed off to the host"),
        Step::new("macrotask-queue", "Task queue", 2000)
            .with_description("Completed callbacks wait for their turn"),
        Step::new("microtask-queue", "Microtask queue", 2000)
            .with_description("Promise reactions drain before the next task"),
        Step::new("event-loop", "Event loop", 1500)
            .with_description("The loop picks the next task once the stack is empty"),
        Step::new("render", "Render", 1500)
            .with_description("The page repaints between tasks"),
    ]
}

fn event_loop_faults() -> Vec<FaultMode> {
    vec![
        FaultMode::new("blocking-task", "Long blocking task"),
        FaultMode::new("unhandled-rejection", "Unhandled promise rejection"),
    ]
}

fn git_areas_steps() -> Vec<Step> {
    vec![
        Step::new("working-tree", "Working tree", 2000)
            .with_description("Edits exist only on disk"),
        Step::new("staging", "Staging area", 2000)
            .with_description("git add records a snapshot in the index"),
        Step::new("local-repo", "Local repository", 2000)
            .with_description("git commit stores the snapshot in history"),
        Step::new("remote", "Remote", 2500).with_description("git push shares the commits"),
    ]
}

fn git_areas_faults() -> Vec<FaultMode> {
    vec![
        FaultMode::new("merge-conflict", "Merge conflict"),
        FaultMode::new("rejected-push", "Push rejected"),
    ]
}
