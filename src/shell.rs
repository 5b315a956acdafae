//! Interactive terminal front end.
//!
//! One screen is active at a time; each line typed at the prompt is parsed
//! into a [`Command`] and routed to that screen's view.

use std::io::Write;

use anyhow::Context;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, info};

use crate::images::ImageUpload;
use crate::session::Session;
use crate::state::AppState;
use crate::views::render;
use crate::views::{
    Backdrop, ForgotPasswordView, HistoryView, LoginView, Notice, Screen, SignupForm, SignupView,
    TrackerView,
};

/// Source of user input. Returns `None` from `line` once input ends.
pub trait Input {
    fn line(&mut self, prompt: &str) -> anyhow::Result<Option<String>>;
    fn secret(&mut self, prompt: &str) -> anyhow::Result<String>;
}

pub struct Terminal {
    editor: DefaultEditor,
}

impl Terminal {
    pub fn new() -> anyhow::Result<Self> {
        let editor = DefaultEditor::new().context("failed to initialize readline")?;
        Ok(Self { editor })
    }
}

impl Input for Terminal {
    fn line(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(Some(line))
            }
            // Ctrl+C / Ctrl+D
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e).context("readline failed"),
        }
    }

    fn secret(&mut self, prompt: &str) -> anyhow::Result<String> {
        rpassword::prompt_password(prompt).context("failed to read password")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    Login(Option<String>),
    Signup,
    Forgot,
    Send(Option<String>),
    Submit,
    Back,
    Upload(String),
    Analyze,
    Meals,
    /// 1-based position in the meal list.
    Delete(usize),
    Clear,
    Save,
    Feedback,
    History,
    Refresh,
    Wipe,
    Logout,
    Usage(&'static str),
    Unknown(String),
}

pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let arg = (!rest.is_empty()).then(|| rest.to_string());

    let cmd = match word.to_ascii_lowercase().as_str() {
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "login" => Command::Login(arg),
        "signup" => Command::Signup,
        "forgot" => Command::Forgot,
        "send" => Command::Send(arg),
        "submit" => Command::Submit,
        "back" => Command::Back,
        "upload" => match arg {
            Some(path) => Command::Upload(path),
            None => Command::Usage("upload <path>"),
        },
        "analyze" => Command::Analyze,
        "meals" => Command::Meals,
        "delete" => match rest.parse::<usize>() {
            Ok(n) if n > 0 => Command::Delete(n),
            _ => Command::Usage("delete <number>"),
        },
        "clear" => Command::Clear,
        "save" => Command::Save,
        "feedback" => Command::Feedback,
        "history" => Command::History,
        "refresh" => Command::Refresh,
        "wipe" => Command::Wipe,
        "logout" => Command::Logout,
        _ => Command::Unknown(word.to_string()),
    };
    Some(cmd)
}

fn help_lines(screen: Screen) -> &'static [(&'static str, &'static str)] {
    match screen {
        Screen::Login => &[
            ("login <email>", "log in (password is prompted)"),
            ("signup", "create an account"),
            ("forgot", "request a password reset link"),
            ("quit", "exit"),
        ],
        Screen::Signup => &[
            ("submit", "fill in the form again"),
            ("back", "return to login"),
            ("quit", "exit"),
        ],
        Screen::ForgotPassword => &[
            ("send [email]", "send another reset link"),
            ("back", "return to login"),
            ("quit", "exit"),
        ],
        Screen::Tracker => &[
            ("upload <path>", "select a food photo"),
            ("analyze", "analyze the selected photo"),
            ("meals", "show today's meals"),
            ("delete <n>", "remove meal number n"),
            ("clear", "remove all meals"),
            ("save", "save today's meals to history"),
            ("feedback", "rate the app"),
            ("history", "open your history"),
            ("logout", "log out"),
            ("quit", "exit"),
        ],
        Screen::History => &[
            ("refresh", "reload your history"),
            ("wipe", "delete all saved days"),
            ("back", "return to the tracker"),
            ("logout", "log out"),
            ("quit", "exit"),
        ],
    }
}

enum Flow {
    Continue,
    Quit,
}

pub struct Shell<W> {
    state: AppState,
    session: Session,
    screen: Screen,
    login: LoginView,
    signup: SignupView,
    forgot: ForgotPasswordView,
    tracker: TrackerView,
    history: HistoryView,
    backdrop: Option<Backdrop>,
    out: W,
}

impl<W: Write> Shell<W> {
    pub fn new(state: AppState, out: W) -> Self {
        let api = state.api.clone();
        Self {
            session: Session::new(),
            screen: Screen::Login,
            login: LoginView::new(api.clone()),
            signup: SignupView::new(api.clone()),
            forgot: ForgotPasswordView::new(api.clone()),
            tracker: TrackerView::new(api.clone()),
            history: HistoryView::new(api),
            backdrop: None,
            state,
            out,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn prompt(&self) -> String {
        let tag = match &self.backdrop {
            Some(backdrop) => format!("{} ", format!("[{}]", backdrop.image()).dimmed()),
            None => String::new(),
        };
        format!("{tag}{}> ", self.screen.label().green())
    }

    fn say(&mut self, notice: &Notice) -> anyhow::Result<()> {
        let text = match notice {
            Notice::Error(msg) => msg.red(),
            Notice::Success(msg) => msg.green(),
            Notice::Info(msg) => msg.normal(),
        };
        writeln!(self.out, "{text}")?;
        Ok(())
    }

    fn help(&mut self) -> anyhow::Result<()> {
        for (cmd, about) in help_lines(self.screen) {
            writeln!(self.out, "  {:<16} {about}", cmd.yellow())?;
        }
        Ok(())
    }

    pub async fn run(&mut self, input: &mut dyn Input) -> anyhow::Result<()> {
        writeln!(self.out, "{}", "MacroMeter".bold().green())?;
        writeln!(
            self.out,
            "Type {} for commands, {} to exit.\n",
            "help".yellow(),
            "quit".yellow()
        )?;
        info!(session_id = %self.session.id(), base_url = %self.state.config.api_base_url, "shell started");

        loop {
            let prompt = self.prompt();
            let Some(line) = input.line(&prompt)? else {
                break;
            };
            let Some(cmd) = parse_command(&line) else {
                continue;
            };
            if let Flow::Quit = self.dispatch(cmd, input).await? {
                break;
            }
        }

        info!(session_id = %self.session.id(), "shell closed");
        Ok(())
    }

    async fn dispatch(&mut self, cmd: Command, input: &mut dyn Input) -> anyhow::Result<Flow> {
        match (self.screen, cmd) {
            (_, Command::Quit) => return Ok(Flow::Quit),
            (_, Command::Help) => self.help()?,
            (_, Command::Usage(usage)) => writeln!(self.out, "usage: {usage}")?,
            (_, Command::Unknown(word)) => {
                writeln!(self.out, "unknown command `{word}`, type {}", "help".yellow())?
            }

            (Screen::Login, Command::Login(email)) => self.log_in(email, input).await?,
            (Screen::Login, Command::Signup) => self.navigate(Screen::Signup, input).await?,
            (Screen::Login, Command::Forgot) => {
                self.navigate(Screen::ForgotPassword, input).await?
            }

            (Screen::Signup, Command::Submit) => self.navigate(Screen::Signup, input).await?,
            (Screen::ForgotPassword, Command::Send(email)) => self.send_reset(email, input).await?,
            (Screen::Signup | Screen::ForgotPassword, Command::Back) => {
                self.navigate(Screen::Login, input).await?
            }

            (Screen::Tracker, Command::Upload(path)) => match ImageUpload::from_path(&path).await {
                Ok(image) => {
                    let notice = self.tracker.select_image(image);
                    self.say(&notice)?;
                }
                Err(e) => self.say(&Notice::error(format!("{e:#}")))?,
            },
            (Screen::Tracker, Command::Analyze) => {
                if self.tracker.selected().is_some() {
                    writeln!(self.out, "Analyzing...")?;
                }
                let notice = self.tracker.analyze(&self.session).await;
                if !notice.is_error() {
                    if let Some(card) = render::analysis(self.tracker.analysis()) {
                        writeln!(self.out, "{card}")?;
                    }
                }
                self.say(&notice)?;
            }
            (Screen::Tracker, Command::Meals) => {
                writeln!(self.out, "{}", render::meal_stack(self.tracker.meals()))?
            }
            (Screen::Tracker, Command::Delete(n)) => match self.tracker.delete_meal(n - 1) {
                Some(meal) => {
                    self.say(&Notice::info(format!("Removed {}.", meal.display_name())))?;
                    writeln!(self.out, "{}", render::meal_stack(self.tracker.meals()))?;
                }
                None => self.say(&Notice::error(format!("There is no meal #{n}.")))?,
            },
            (Screen::Tracker, Command::Clear) => {
                self.tracker.clear_meals();
                self.say(&Notice::info("Meal list cleared."))?;
            }
            (Screen::Tracker, Command::Save) => {
                let notice = self.tracker.save_daily(&self.session).await;
                self.say(&notice)?;
            }
            (Screen::Tracker, Command::Feedback) => self.feedback(input).await?,
            (Screen::Tracker, Command::History) => self.navigate(Screen::History, input).await?,

            (Screen::History, Command::Refresh) => {
                match self.history.refresh(&self.session).await {
                    Some(notice) => self.say(&notice)?,
                    None => writeln!(self.out, "{}", render::history(self.history.entries()))?,
                }
            }
            (Screen::History, Command::Wipe) => self.wipe(input).await?,
            (Screen::History, Command::Back) => self.navigate(Screen::Tracker, input).await?,

            (Screen::Tracker | Screen::History, Command::Logout) => self.log_out(input).await?,

            (screen, _) => writeln!(
                self.out,
                "not available on the {} screen, type {}",
                screen.label(),
                "help".yellow()
            )?,
        }
        Ok(Flow::Continue)
    }

    /// Switches screens, following redirects until one settles.
    async fn navigate(&mut self, target: Screen, input: &mut dyn Input) -> anyhow::Result<()> {
        let mut next = Some(target);
        while let Some(screen) = next.take() {
            debug!(from = self.screen.label(), to = screen.label(), "navigate");
            self.screen = screen;
            self.sync_backdrop();

            next = match screen {
                Screen::Login => None,
                Screen::Signup => self.fill_signup(input).await?,
                Screen::ForgotPassword => {
                    self.send_reset(None, input).await?;
                    None
                }
                Screen::Tracker => match self.tracker.enter(&mut self.session).await {
                    Some(redirect) => {
                        self.say(&Notice::error("Please log in to continue."))?;
                        Some(redirect)
                    }
                    None => {
                        writeln!(self.out, "{}", render::meal_stack(self.tracker.meals()))?;
                        None
                    }
                },
                Screen::History => match self.history.mount(&self.session).await {
                    Err(redirect) => {
                        self.say(&Notice::error("Please log in to continue."))?;
                        Some(redirect)
                    }
                    Ok(Some(notice)) => {
                        self.say(&notice)?;
                        None
                    }
                    Ok(None) => {
                        writeln!(self.out, "{}", render::history(self.history.entries()))?;
                        None
                    }
                },
            };
        }
        Ok(())
    }

    fn sync_backdrop(&mut self) {
        if !self.screen.has_backdrop() {
            self.backdrop = None;
        } else if self.backdrop.is_none() {
            self.backdrop = Some(Backdrop::start(&self.state.config.backdrop));
        }
    }

    async fn log_in(&mut self, email: Option<String>, input: &mut dyn Input) -> anyhow::Result<()> {
        let email = match email {
            Some(email) => email,
            None => match input.line("Email: ")? {
                Some(email) => email,
                None => return Ok(()),
            },
        };
        let password = input.secret("Password: ")?;

        match self.login.submit(&mut self.session, &email, &password).await {
            Some(next) => {
                self.say(&Notice::success("Logged in."))?;
                self.navigate(next, input).await
            }
            None => {
                let msg = self.login.error().unwrap_or("Invalid email or password").to_string();
                self.say(&Notice::error(msg))
            }
        }
    }

    async fn fill_signup(&mut self, input: &mut dyn Input) -> anyhow::Result<Option<Screen>> {
        let mut form = SignupForm::default();
        let Some(username) = input.line("Username: ")? else {
            return Ok(None);
        };
        form.username = username;
        let Some(email) = input.line("Email: ")? else {
            return Ok(None);
        };
        form.email = email;
        form.password = input.secret("Password: ")?;
        form.confirm_password = input.secret("Confirm password: ")?;

        match self.signup.submit(&form).await {
            Some(next) => {
                self.say(&Notice::success("Account created. Please log in."))?;
                Ok(Some(next))
            }
            None => {
                let msg = self.signup.error().unwrap_or("Registration failed").to_string();
                self.say(&Notice::error(msg))?;
                writeln!(
                    self.out,
                    "Type {} to try again or {} to return.",
                    "submit".yellow(),
                    "back".yellow()
                )?;
                Ok(None)
            }
        }
    }

    async fn send_reset(&mut self, email: Option<String>, input: &mut dyn Input) -> anyhow::Result<()> {
        let email = match email {
            Some(email) => email,
            None => match input.line("Email: ")? {
                Some(email) => email,
                None => return Ok(()),
            },
        };
        let notice = self.forgot.submit(&email).await;
        self.say(&notice)
    }

    async fn feedback(&mut self, input: &mut dyn Input) -> anyhow::Result<()> {
        self.tracker.open_feedback();

        let rating = input.line("Rating (1-5): ")?.unwrap_or_default();
        if let Ok(stars) = rating.trim().parse::<u8>() {
            if let Err(e) = self.tracker.set_rating(stars) {
                self.tracker.close_feedback();
                return self.say(&Notice::error(e.to_string()));
            }
        }
        let comment = input.line("Comment (optional): ")?.unwrap_or_default();
        self.tracker.set_comment(comment.trim());

        let notice = self.tracker.submit_feedback(&self.session).await;
        if notice.is_error() {
            self.tracker.close_feedback();
        }
        self.say(&notice)
    }

    async fn wipe(&mut self, input: &mut dyn Input) -> anyhow::Result<()> {
        let answer = input
            .line("Delete every saved day? [y/N] ")?
            .unwrap_or_default();
        if !matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
            return self.say(&Notice::info("Nothing was deleted."));
        }
        match self.history.wipe(&self.session).await {
            Some(notice) => self.say(&notice),
            None => self.say(&Notice::success("History cleared.")),
        }
    }

    async fn log_out(&mut self, input: &mut dyn Input) -> anyhow::Result<()> {
        let next = match self.screen {
            Screen::History => self.history.logout(&mut self.session),
            _ => self.tracker.logout(&mut self.session),
        };
        self.tracker = TrackerView::new(self.state.api.clone());
        self.history = HistoryView::new(self.state.api.clone());
        self.say(&Notice::info("Logged out."))?;
        self.navigate(next, input).await
    }
}

pub async fn run_shell(state: AppState) -> anyhow::Result<()> {
    let mut terminal = Terminal::new()?;
    let mut shell = Shell::new(state, std::io::stdout());
    shell.run(&mut terminal).await
}
