use crate::config::Settings;
use crate::error::Error;
use crate::filter;
use crate::github::RepositoryRecord;
use crate::selection::Selection;
use std::time::{Duration, Instant};

/// How long the "Copied!" notice stays in the status bar
const NOTICE_DURATION: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    /// No organizations configured yet
    Setup,
    Search,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Idle,
    Loading,
    Error(String),
}

impl Status {
    pub fn text(&self) -> &str {
        match self {
            Status::Idle => "",
            Status::Loading => "Loading repositories...",
            Status::Error(msg) => msg,
        }
    }
}

/// Session state for one run of the search screen
pub struct App {
    pub settings: Settings,
    pub screen: Screen,
    pub status: Status,
    pub show_help: bool,

    // Data
    all_repos: Vec<RepositoryRecord>,
    filtered: Vec<usize>,

    // Input and selection
    query: String,
    selection: Selection,

    notice: Option<(String, Instant)>,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        let mut app = Self {
            settings: Settings::default(),
            screen: Screen::Setup,
            status: Status::Idle,
            show_help: false,
            all_repos: Vec::new(),
            filtered: Vec::new(),
            query: String::new(),
            selection: Selection::new(),
            notice: None,
        };
        app.reset(settings);
        app
    }

    /// Start over with new settings, dropping the loaded list and the query
    pub fn reset(&mut self, settings: Settings) {
        self.screen = if settings.has_organizations() {
            Screen::Search
        } else {
            Screen::Setup
        };
        self.status = Status::Idle;
        self.settings = settings;
        self.all_repos.clear();
        self.query.clear();
        self.notice = None;
        self.refilter();
    }

    /// Take settings re-read from disk. The session starts over only when the
    /// organization list changed; returns whether it did.
    pub fn reload_settings(&mut self, settings: Settings) -> bool {
        if settings.organizations == self.settings.organizations {
            return false;
        }
        self.reset(settings);
        true
    }

    pub fn needs_setup(&self) -> bool {
        self.screen == Screen::Setup
    }

    pub fn set_loading(&mut self) {
        self.status = Status::Loading;
    }

    pub fn set_repos(&mut self, repos: Vec<RepositoryRecord>) {
        self.all_repos = repos;
        self.status = Status::Idle;
        self.refilter();
    }

    pub fn set_error(&mut self, err: &Error) {
        self.status = Status::Error(format!("Error: {err}"));
    }

    /// Apply the outcome of a repository load
    pub fn finish_load(&mut self, result: Result<Vec<RepositoryRecord>, Error>) {
        match result {
            Ok(repos) => self.set_repos(repos),
            Err(Error::Cancelled) => self.status = Status::Idle,
            Err(e) => self.set_error(&e),
        }
    }

    pub fn all_repos(&self) -> &[RepositoryRecord] {
        &self.all_repos
    }

    pub fn filtered_repos(&self) -> Vec<&RepositoryRecord> {
        self.filtered.iter().map(|&idx| &self.all_repos[idx]).collect()
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selection.index()
    }

    // Recompute the filtered view; any change invalidates the selection
    fn refilter(&mut self) {
        self.filtered = filter::filter_indices(&self.all_repos, &self.query);
        self.selection.reset();
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.refilter();
    }

    pub fn handle_char(&mut self, c: char) {
        self.query.push(c);
        self.refilter();
    }

    pub fn handle_backspace(&mut self) {
        if self.query.pop().is_some() {
            self.refilter();
        }
    }

    pub fn clear_query(&mut self) {
        if !self.query.is_empty() {
            self.query.clear();
            self.refilter();
        }
    }

    /// Digits 1-9 jump to a visible row; otherwise they are typed into the query
    pub fn handle_digit(&mut self, c: char) {
        let used = c
            .to_digit(10)
            .map(|d| self.selection.jump_to_digit(d, self.filtered.len()))
            .unwrap_or(false);
        if !used {
            self.handle_char(c);
        }
    }

    pub fn next(&mut self) {
        self.selection.move_down(self.filtered.len());
    }

    pub fn previous(&mut self) {
        self.selection.move_up();
    }

    pub fn selected_repo(&self) -> Option<&RepositoryRecord> {
        self.selection
            .selected(&self.filtered)
            .map(|&idx| &self.all_repos[idx])
    }

    /// URL of the selected repository, if any row is selected
    pub fn activate(&self) -> Option<String> {
        self.selected_repo().map(|r| r.url.clone())
    }

    /// Clone command for the selected row, or the first row without a selection
    pub fn clone_command(&self) -> Option<String> {
        self.selected_repo()
            .or_else(|| self.filtered.first().map(|&idx| &self.all_repos[idx]))
            .map(RepositoryRecord::clone_command)
    }

    pub fn count_text(&self) -> String {
        if self.filtered.is_empty() {
            String::new()
        } else {
            format!("{} of {} repos", self.filtered.len(), self.all_repos.len())
        }
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        self.notice = Some((message.into(), Instant::now()));
    }

    /// Transient notice, if it has not expired
    pub fn notice(&self) -> Option<&str> {
        self.notice
            .as_ref()
            .filter(|(_, at)| at.elapsed() < NOTICE_DURATION)
            .map(|(msg, _)| msg.as_str())
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }
}

// Help content lines - format: "KEY|DESCRIPTION|COLOR" where COLOR is optional
pub fn get_help_content() -> Vec<String> {
    vec![
        "HEADER|Search".to_string(),
        "type|Filter by keywords (all must match)|".to_string(),
        "Backspace|Delete last character|".to_string(),
        "Ctrl-U|Clear the query|".to_string(),
        "".to_string(),
        "HEADER|Navigation".to_string(),
        "↓/Ctrl-N|Move down|".to_string(),
        "↑/Ctrl-P|Move up|".to_string(),
        "1-9|Jump to result|cyan".to_string(),
        "".to_string(),
        "HEADER|Actions".to_string(),
        "Enter|Open in browser|green".to_string(),
        "Tab/Ctrl-Y|Copy clone command|magenta".to_string(),
        "Ctrl-R|Clear cache and reload|yellow".to_string(),
        "Esc|Quit|".to_string(),
        "".to_string(),
        "|Press F1 or Esc to close|".to_string(),
    ]
}
