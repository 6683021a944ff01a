//! Post display and the interactive navigation loop.

use std::io::{BufRead, Write};

use skythread_common::http_client::HttpClient;
use skythread_common::types::{AtUri, Did};
use smol_str::SmolStr;

use crate::client::CredentialSession;
use crate::config::AppConfig;
use crate::convert::{self, BskyPostUrl, Target};
use crate::error::{Result, SkythreadError};
use crate::extract::{self, AuthorView, LikeView, NO_TEXT_CONTENT, ReplyLinks, ReplyView};
use crate::render::{self, Console};

/// One line of input at the `Enter option:` prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `q`
    Quit,
    /// `n`
    New,
    /// `p`
    Parent,
    /// `r`
    Root,
    /// A 1-based reply number
    Reply(usize),
    /// Anything else
    Invalid,
}

impl Command {
    /// Parse trimmed, case-insensitive input.
    pub fn parse(input: &str) -> Self {
        let input = input.trim().to_lowercase();
        match input.as_str() {
            "q" => Self::Quit,
            "n" => Self::New,
            "p" => Self::Parent,
            "r" => Self::Root,
            digits if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
                digits.parse().map_or(Self::Invalid, Self::Reply)
            }
            _ => Self::Invalid,
        }
    }
}

/// What the last successfully displayed post lets you navigate to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// The post on screen
    pub current: AtUri,
    /// Its parent and root, when it is a reply
    pub links: ReplyLinks,
    /// URIs of its direct replies in display order; `None` if the thread
    /// could not be fetched
    pub replies: Option<Vec<Option<SmolStr>>>,
}

/// Summary of a post shown in the thread context.
struct PostDetails {
    author: String,
    created_at: SmolStr,
    text: SmolStr,
    web_url: String,
}

/// Drives the display of posts and the command loop for one session.
pub struct Navigator<'a, T, R, W> {
    session: &'a CredentialSession<T>,
    console: &'a mut Console<R, W>,
    config: &'a AppConfig,
    state: Option<Navigation>,
}

impl<'a, T, R, W> Navigator<'a, T, R, W>
where
    T: HttpClient + Send + Sync,
    R: BufRead,
    W: Write,
{
    pub fn new(
        session: &'a CredentialSession<T>,
        console: &'a mut Console<R, W>,
        config: &'a AppConfig,
    ) -> Self {
        Self {
            session,
            console,
            config,
            state: None,
        }
    }

    /// Navigation state of the post currently on screen.
    pub fn state(&self) -> Option<&Navigation> {
        self.state.as_ref()
    }

    /// Show the initial post (or prompt for one), then run the command loop.
    pub async fn start(&mut self, initial: Option<&str>) -> Result<()> {
        match initial {
            Some(url) => {
                self.console
                    .line(format_args!("Found URL in credentials: {url}"))?;
                let opened = self.open_input(url).await;
                if let Err(e) = opened {
                    if !e.is_recoverable() {
                        return Err(e);
                    }
                    self.console.line(format_args!(
                        "Error processing initial URL from credentials: {e}"
                    ))?;
                }
                if self.state.is_none() {
                    self.console.line("Continuing to interactive mode...")?;
                }
            }
            None => {
                self.console.line("No initial URL provided in credentials.")?;
                self.console.line("Starting in interactive mode...")?;
                if !self.prompt_initial().await? {
                    self.console.line("Exiting...")?;
                    return Ok(());
                }
            }
        }
        self.run().await
    }

    /// Keep asking for a URL or AT URI until a post displays.
    ///
    /// Returns `false` if input ends first.
    pub async fn prompt_initial(&mut self) -> Result<bool> {
        while self.state.is_none() {
            let Some(input) = self.console.prompt("\nEnter a Bluesky URL or AT URI: ")? else {
                return Ok(false);
            };
            if input.is_empty() {
                continue;
            }
            let opened = self.open_input(&input).await;
            self.report("processing input", opened)?;
        }
        Ok(true)
    }

    /// The command loop. Returns on `q` or end of input.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let Some(choice) = self.console.prompt("\nEnter option: ")? else {
                self.console.line("Exiting...")?;
                return Ok(());
            };
            let command = Command::parse(&choice);
            tracing::debug!(?command, "command");
            match command {
                Command::Quit => {
                    self.console.line("Exiting...")?;
                    return Ok(());
                }
                Command::New => {
                    let Some(input) = self.console.prompt("Enter URI/URL: ")? else {
                        self.console.line("Exiting...")?;
                        return Ok(());
                    };
                    let opened = self.open_input(&input).await;
                    self.report("processing input", opened)?;
                }
                Command::Parent => {
                    match self.state.as_ref().and_then(|s| s.links.parent.clone()) {
                        Some(parent) => {
                            let shown = self.goto(&parent).await;
                            self.report("navigating to parent", shown)?;
                        }
                        None => self.console.line("Invalid option")?,
                    }
                }
                Command::Root => {
                    let root = self
                        .state
                        .as_ref()
                        .and_then(|s| s.links.distinct_root().map(SmolStr::new));
                    match root {
                        Some(root) => {
                            let shown = self.goto(&root).await;
                            self.report("navigating to root", shown)?;
                        }
                        None => self.console.line("Invalid option")?,
                    }
                }
                Command::Reply(n) => self.goto_reply(n).await?,
                Command::Invalid => self.console.line("Invalid option")?,
            }
        }
    }

    async fn goto_reply(&mut self, n: usize) -> Result<()> {
        let Some(replies) = self.state.as_ref().and_then(|s| s.replies.as_ref()) else {
            return Ok(self.console.line("Invalid option")?);
        };
        let count = replies.len();
        let target = match n.checked_sub(1).and_then(|i| replies.get(i)) {
            None => {
                return Ok(self.console.line(format_args!(
                    "Invalid reply number. Please choose 1-{count}"
                ))?);
            }
            Some(None) => None,
            Some(Some(uri)) => Some(uri.clone()),
        };
        match target {
            Some(uri) => {
                let shown = self.goto(&uri).await;
                self.report("navigating to reply", shown)
            }
            None => Ok(self.console.line(format_args!("Reply {n} is unavailable"))?),
        }
    }

    /// Print a recoverable error and carry on; anything else is passed up.
    fn report(&mut self, context: &str, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) => Ok(()),
            Err(e) if e.is_recoverable() => {
                tracing::warn!(error = %e, "{context}");
                self.console.line(format_args!("Error {context}: {e}"))?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Turn user input into a post and show it.
    ///
    /// Input that is neither an AT URI nor a post URL is reported and leaves
    /// the state alone.
    pub async fn open_input(&mut self, input: &str) -> Result<()> {
        let uri = match Target::classify(input) {
            Some(Target::AtUri(uri)) => AtUri::new(uri)?,
            Some(Target::WebUrl(url)) => self.convert(&url).await?,
            None => {
                return Ok(self
                    .console
                    .line("Invalid input. Please enter a valid Bluesky URL or AT URI.")?);
            }
        };
        self.show(&uri).await
    }

    async fn convert(&mut self, url: &str) -> Result<AtUri> {
        let parsed = BskyPostUrl::parse(url)?;
        self.console.line(format_args!("Converting URL: {url}"))?;
        self.console.line(format_args!(
            "Handle or DID: {}, Record key: {}",
            parsed.actor, parsed.rkey
        ))?;
        if parsed.has_did() {
            self.console.line("Using DID directly")?;
        }
        let uri = parsed.to_at_uri(self.session).await?;
        if !parsed.has_did() {
            self.console.line(format_args!(
                "Resolved handle {} to DID: {}",
                parsed.actor,
                uri.authority()
            ))?;
        }
        Ok(uri)
    }

    async fn goto(&mut self, uri: &str) -> Result<()> {
        let uri = AtUri::new(uri)?;
        self.show(&uri).await
    }

    /// Display a post and, on success, make it the current one.
    pub async fn show(&mut self, uri: &AtUri) -> Result<()> {
        let navigation = self.display(uri).await?;
        self.state = Some(navigation);
        Ok(())
    }

    /// Render everything about one post.
    ///
    /// Only a failure to fetch the record itself is an error; every other
    /// section degrades to a note.
    #[tracing::instrument(level = "debug", skip_all, fields(uri = %uri))]
    async fn display(&mut self, uri: &AtUri) -> Result<Navigation> {
        self.console.banner(format_args!("Processing: {uri}"))?;
        let (author, _) = uri.parts();
        let web_url = convert::web_url(uri);
        self.console.line("")?;
        self.console.link_line("Bluesky Web URL: ", &web_url)?;

        let record = self
            .session
            .get_record(uri)
            .await
            .map_err(|source| SkythreadError::RecordFetchFailed {
                uri: uri.as_str().into(),
                source,
            })?
            .value;
        self.console.line("\nSuccessfully fetched post data")?;

        self.console.section("POST CONTENT")?;
        self.show_author(author).await?;
        let posted = extract::created_at(&record);
        self.console.line(format_args!("Posted: {posted}"))?;

        let thread = self.session.get_post_thread(uri, Some(1)).await;
        if let Err(e) = &thread {
            tracing::warn!(error = %e, "thread fetch failed");
        }
        let thread_post = thread.as_ref().ok().and_then(|t| t.get("post"));

        let text = extract::find_text(&record)
            .or_else(|| thread_post.and_then(extract::find_text))
            .unwrap_or(NO_TEXT_CONTENT);
        self.console.line(format_args!("\nText: {text}"))?;
        self.console.line(format_args!("URI: {uri}"))?;
        self.console.link_line("App URL: ", &web_url)?;

        let images = extract::extract_images(&record);
        if !images.is_empty() {
            self.console.line("\nImages:")?;
            for (i, image) in images.iter().enumerate() {
                let target = match &image.reference {
                    Some(reference) if Did::looks_like_did(author) => {
                        self.console.link(&render::image_url(author, reference))
                    }
                    Some(reference) => self.console.link(reference),
                    None => "No URL available".to_owned(),
                };
                self.console
                    .line(format_args!("  [{}] {}: {target}", i + 1, image.alt_text()))?;
            }
        }

        let mut links = extract::extract_reply_links(&record);
        if links.is_empty() {
            if let Ok(thread) = &thread {
                links = extract::thread_links(thread);
            }
        }
        if !links.is_empty() {
            self.show_thread_context(uri, &links, posted, &web_url)
                .await?;
        }

        self.console.section("REPLIES")?;
        let replies = match &thread {
            Ok(thread) => {
                let views: Vec<ReplyView> = extract::thread_replies(thread)
                    .iter()
                    .map(ReplyView::from_data)
                    .collect();
                if views.is_empty() {
                    self.console.line("No direct replies found.")?;
                }
                for (i, view) in views.iter().enumerate() {
                    self.show_listed_post(i + 1, view, "replied")?;
                }
                if !views.is_empty() {
                    self.console.section("REPLY URIS (for quick access)")?;
                    for (i, view) in views.iter().enumerate() {
                        let reply = view.uri.as_deref().unwrap_or("Unknown URI");
                        self.console.line(format_args!("[{}] {reply}", i + 1))?;
                    }
                }
                // placeholders keep their slot in the numbering but cannot be opened
                Some(
                    views
                        .into_iter()
                        .map(|v| match v.unavailable {
                            None => v.uri,
                            Some(_) => None,
                        })
                        .collect::<Vec<_>>(),
                )
            }
            Err(e) => {
                self.console
                    .line(format_args!("Error fetching replies: {e}"))?;
                None
            }
        };

        self.show_likes(uri).await?;
        self.show_quotes(uri).await?;

        self.console.section("NAVIGATION OPTIONS")?;
        if let Some(parent) = &links.parent {
            self.console
                .line(format_args!("[p] View parent post: {parent}"))?;
        }
        if let Some(root) = links.distinct_root() {
            self.console.line(format_args!("[r] View root post: {root}"))?;
        }
        if let Some(count) = replies.as_ref().map(Vec::len).filter(|n| *n > 0) {
            self.console.line(format_args!("[1-{count}] View reply"))?;
        }
        self.console.line("[n] Enter new URI/URL")?;
        self.console.line("[q] Quit")?;

        Ok(Navigation {
            current: uri.clone(),
            links,
            replies,
        })
    }

    async fn show_author(&mut self, author: &str) -> Result<()> {
        if !Did::looks_like_did(author) {
            return Ok(self.console.line(format_args!("Author ID: {author}"))?);
        }
        match self.session.get_profile(author).await {
            Ok(profile) => {
                let view = AuthorView::from_data(&profile);
                match (&view.display_name, &view.handle) {
                    (Some(name), Some(handle)) => self
                        .console
                        .line(format_args!("Author: {name} (@{handle})"))?,
                    (None, Some(handle)) => self
                        .console
                        .line(format_args!("Author: @{handle} ({author})"))?,
                    _ => self.console.line(format_args!("Author DID: {author}"))?,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, author, "profile fetch failed");
                self.console.line(format_args!(
                    "Author DID: {author} (Unable to fetch profile: {e})"
                ))?
            }
        }
        Ok(())
    }

    async fn show_thread_context(
        &mut self,
        uri: &AtUri,
        links: &ReplyLinks,
        posted: &str,
        web_url: &str,
    ) -> Result<()> {
        self.console.section("THREAD CONTEXT")?;
        if let Some(root) = links.distinct_root() {
            self.console.line("\nROOT POST:")?;
            self.show_context_post(root).await?;
        }
        if let Some(parent) = &links.parent {
            self.console.line("\nPARENT POST:")?;
            self.show_context_post(parent).await?;
        }

        let (author, _) = uri.parts();
        let is_me = self
            .session
            .session_info()
            .await
            .is_some_and(|(did, _)| did.as_str() == author);
        self.console.line("\nCURRENT POST:")?;
        self.console.line(format_args!(
            "  Author: {}",
            if is_me { "You" } else { author }
        ))?;
        self.console.line(format_args!("  Posted: {posted}"))?;
        self.console.line(format_args!("  URI: {uri}"))?;
        self.console.link_line("  App URL: ", web_url)?;
        Ok(())
    }

    async fn show_context_post(&mut self, uri: &str) -> Result<()> {
        match self.post_details(uri).await {
            Ok(details) => {
                self.console
                    .line(format_args!("  Author: {}", details.author))?;
                self.console
                    .line(format_args!("  Posted: {}", details.created_at))?;
                self.console.line(format_args!("  Text: {}", details.text))?;
                self.console.line(format_args!("  URI: {uri}"))?;
                self.console.link_line("  App URL: ", &details.web_url)?;
            }
            Err(e) if e.is_recoverable() => {
                tracing::warn!(error = %e, uri, "context post unavailable");
                self.console
                    .line(format_args!("Error fetching post details: {e}"))?;
                self.console.link_line("  URI: ", uri)?;
                self.console.line("  (Unable to fetch details)")?;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    async fn post_details(&self, uri: &str) -> Result<PostDetails> {
        let uri = AtUri::new(uri)?;
        let record = self
            .session
            .get_record(&uri)
            .await
            .map_err(|source| SkythreadError::RecordFetchFailed {
                uri: uri.as_str().into(),
                source,
            })?
            .value;
        let (did, _) = uri.parts();
        let author = match self.session.get_profile(did).await {
            Ok(profile) => {
                let view = AuthorView::from_data(&profile);
                if view.handle.is_some() {
                    view.label()
                } else {
                    did.to_owned()
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, author = did, "profile fetch failed");
                format!("{did} (Unable to fetch profile: {e})")
            }
        };
        Ok(PostDetails {
            author,
            created_at: extract::created_at(&record).into(),
            text: extract::extract_text(&record).into(),
            web_url: convert::web_url(&uri),
        })
    }

    /// One numbered entry of the replies or quotes list.
    fn show_listed_post(&mut self, n: usize, view: &ReplyView, verb: &str) -> Result<()> {
        if let Some(reason) = view.unavailable {
            self.console
                .line(format_args!("\n[{n}] ({})", reason.describe()))?;
            if let Some(uri) = &view.uri {
                self.console.line(format_args!("  URI: {uri}"))?;
            }
            return Ok(());
        }
        self.console.line(format_args!(
            "\n[{n}] {} {verb} at {}:",
            view.author.label(),
            view.created_at
        ))?;
        self.console.line(format_args!("  {}", view.text))?;
        let uri = view.uri.as_deref().unwrap_or("Unknown URI");
        self.console.line(format_args!("  URI: {uri}"))?;
        match AtUri::new(uri) {
            Ok(parsed) => self
                .console
                .link_line("  App URL: ", &convert::web_url(&parsed))?,
            Err(_) => self.console.line("  App URL: Unknown")?,
        }
        Ok(())
    }

    async fn show_likes(&mut self, uri: &AtUri) -> Result<()> {
        let limit = self.config.likes_limit;
        if limit <= 0 {
            return Ok(());
        }
        self.console.section("LIKES")?;
        match self.session.get_likes(uri, limit).await {
            Ok(likes) if likes.is_empty() => self.console.line("No likes found.")?,
            Ok(likes) => {
                for like in likes.iter().map(LikeView::from_data) {
                    self.console.line(format_args!(
                        "  {} liked at {}",
                        like.actor.label(),
                        like.created_at
                    ))?;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "likes fetch failed");
                self.console
                    .line(format_args!("Error fetching likes: {e}"))?
            }
        }
        Ok(())
    }

    async fn show_quotes(&mut self, uri: &AtUri) -> Result<()> {
        let limit = self.config.quotes_limit;
        if limit <= 0 {
            return Ok(());
        }
        self.console.section("QUOTES")?;
        match self.session.get_quotes(uri, limit).await {
            Ok(posts) if posts.is_empty() => self.console.line("No quotes found.")?,
            Ok(posts) => {
                for (i, post) in posts.iter().enumerate() {
                    self.show_listed_post(i + 1, &ReplyView::from_post(post), "quoted")?;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "quotes fetch failed");
                self.console
                    .line(format_args!("Error fetching quotes: {e}"))?
            }
        }
        Ok(())
    }
}
