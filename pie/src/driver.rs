use std::any::Any;
use std::cell::RefCell;
use std::io::{Read, Write};
use std::panic;
use std::path::Path;
use std::sync::Arc;

use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};
use codespan_reporting::term::termcolor::{BufferedStandardStream, ColorChoice, WriteColor};
use itertools::Itertools;
use scoped_arena::Scope;

use crate::context::{Context, Renaming};
use crate::core::semantics;
use crate::core::{self, pretty};
use crate::source::{FileId, Files};
use crate::surface::elaboration::{Elaborator, Hole, Info, ItemResult};
use crate::surface::{self, Module};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Status {
    Ok,
    Error,
}

impl Status {
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Error => 1,
        }
    }
}

fn color_choice(stream: atty::Stream) -> ColorChoice {
    match atty::is(stream) {
        true => ColorChoice::Auto,
        false => ColorChoice::Never,
    }
}

pub struct Driver {
    files: Files,

    allow_errors: bool,
    seen_errors: RefCell<bool>,
    codespan_config: codespan_reporting::term::Config,
    diagnostic_writer: RefCell<Box<dyn WriteColor>>,

    emit_width: usize,
    emit_writer: RefCell<Box<dyn WriteColor>>,

    print_context: bool,
    show_info: bool,
}

impl Default for Driver {
    fn default() -> Driver {
        Driver::new()
    }
}

impl Driver {
    pub fn new() -> Driver {
        Driver {
            files: Files::new(),

            allow_errors: false,
            seen_errors: RefCell::new(false),
            codespan_config: codespan_reporting::term::Config::default(),
            diagnostic_writer: RefCell::new(Box::new(BufferedStandardStream::stderr(
                color_choice(atty::Stream::Stderr),
            ))),

            emit_width: usize::MAX,
            emit_writer: RefCell::new(Box::new(BufferedStandardStream::stdout(color_choice(
                atty::Stream::Stdout,
            )))),

            print_context: false,
            show_info: false,
        }
    }

    /// Setup a global panic hook
    pub fn install_panic_hook(&self) {
        // Use the currently set codespan configuration
        let term_config = self.codespan_config.clone();
        // Fetch the default hook (which prints the panic message and an optional backtrace)
        let default_hook = std::panic::take_hook();

        std::panic::set_hook(Box::new(move |info| {
            let message = panic_message(info.payload());
            let diagnostic = bug_diagnostic(message, info.location());

            let mut writer = BufferedStandardStream::stderr(color_choice(atty::Stream::Stderr));
            let dummy_files = Files::new();

            default_hook(info);
            eprintln!();
            if codespan_reporting::term::emit(&mut writer, &term_config, &dummy_files, &diagnostic)
                .is_err()
            {
                eprintln!("error: pie panicked at '{message}'");
            }
        }));
    }

    /// Set to true if we should attempt to continue after encountering errors
    pub fn set_allow_errors(&mut self, allow_errors: bool) {
        self.allow_errors = allow_errors;
    }

    /// Print the context after elaborating a module
    pub fn set_print_context(&mut self, print_context: bool) {
        self.print_context = print_context;
    }

    /// Report the type of every expression written in the source
    pub fn set_show_info(&mut self, show_info: bool) {
        self.show_info = show_info;
    }

    /// Set the writer to use when rendering diagnostics
    pub fn set_diagnostic_writer(&mut self, stream: impl 'static + WriteColor) {
        self.diagnostic_writer = RefCell::new(Box::new(stream) as Box<dyn WriteColor>);
    }

    /// Set the width to use when emitting terms
    pub fn set_emit_width(&mut self, emit_width: usize) {
        self.emit_width = emit_width;
    }

    /// Set the writer to use when emitting terms
    pub fn set_emit_writer(&mut self, stream: impl 'static + WriteColor) {
        self.emit_writer = RefCell::new(Box::new(stream) as Box<dyn WriteColor>);
    }

    /// Load a source string into the file database.
    pub fn load_source_string(&mut self, name: String, source: String) -> FileId {
        self.files.add(name, source)
    }

    /// Load a source file into the file database using a reader.
    pub fn load_source(&mut self, name: String, mut reader: impl Read) -> Option<FileId> {
        let mut source = String::new();
        match reader.read_to_string(&mut source) {
            Ok(_) => Some(self.load_source_string(name, source)),
            Err(error) => {
                self.emit_read_diagnostic(name, error);
                None
            }
        }
    }

    /// Load a source file into the file database from the given path.
    pub fn load_source_path(&mut self, path: &Path) -> Option<FileId> {
        match std::fs::File::open(path) {
            Ok(file) => self.load_source(path.display().to_string(), file),
            Err(error) => {
                self.emit_read_diagnostic(path.display(), error);
                None
            }
        }
    }

    /// Process each top-level item of a module in turn. Items that fail to
    /// elaborate are reported, and leave the context as it was.
    pub fn elaborate_and_emit_module(&mut self, file_id: FileId) -> Status {
        let scope = Scope::new();
        let module = match self.parse_module(&scope, file_id) {
            Some(module) => module,
            None => return Status::Error,
        };

        let mut elaborator = Elaborator::new();
        elaborator.set_report_infos(self.show_info);
        let mut context = Context::new();

        for item in module.items {
            match elaborator.process_item(&context, item) {
                Ok(ItemResult::Context(next_context)) => context = next_context,
                Ok(ItemResult::Checked) => {}
                Ok(ItemResult::Normalized { r#type, expr }) => self.emit_the(r#type, expr),
                Err(message) => self.emit_diagnostic(message.to_diagnostic()),
            }
            self.emit_holes_and_infos(&mut elaborator);
        }

        if self.print_context {
            let pp = pretty::Context::new();
            for entry in context.read_back_context() {
                self.emit_doc(entry.to_doc(&pp));
            }
        }

        self.status()
    }

    /// Elaborate a term, printing it along with its type.
    pub fn elaborate_and_emit_term(&mut self, file_id: FileId) -> Status {
        let scope = Scope::new();
        let term = match self.parse_term(&scope, file_id) {
            Some(term) => term,
            None => return Status::Error,
        };

        let mut elaborator = Elaborator::new();
        elaborator.set_report_infos(self.show_info);
        let context = Context::new();
        let result = elaborator.elaborate(&context, &Renaming::new(), &term);
        self.emit_holes_and_infos(&mut elaborator);

        match result {
            Ok(synth) => {
                let r#type = context.read_back_type(&synth.r#type);
                self.emit_the(r#type, synth.term);
            }
            Err(message) => self.emit_diagnostic(message.to_diagnostic()),
        }

        self.status()
    }

    /// Elaborate a term, printing its normal form along with its type.
    pub fn normalise_and_emit_term(&mut self, file_id: FileId) -> Status {
        let scope = Scope::new();
        let term = match self.parse_term(&scope, file_id) {
            Some(term) => term,
            None => return Status::Error,
        };

        let mut elaborator = Elaborator::new();
        let result = elaborator.normalize_term(&Context::new(), &term);
        self.emit_holes_and_infos(&mut elaborator);

        match result {
            Ok((r#type, expr)) => self.emit_the(r#type, expr),
            Err(message) => self.emit_diagnostic(message.to_diagnostic()),
        }

        self.status()
    }

    fn status(&self) -> Status {
        // Fail if we’ve seen any errors, unless `allow_errors` is enabled
        match *self.seen_errors.borrow() && !self.allow_errors {
            true => Status::Error,
            false => Status::Ok,
        }
    }

    fn parse_module<'arena>(
        &self,
        scope: &'arena Scope<'arena>,
        file_id: FileId,
    ) -> Option<Module<'arena>> {
        let source = self.file_source(file_id)?;
        match Module::parse(scope, file_id, source) {
            Ok(module) => Some(module),
            Err(message) => {
                self.emit_diagnostic(message.to_diagnostic());
                None
            }
        }
    }

    fn parse_term<'arena>(
        &self,
        scope: &'arena Scope<'arena>,
        file_id: FileId,
    ) -> Option<surface::Term<'arena>> {
        let source = self.file_source(file_id)?;
        match surface::Term::parse(scope, file_id, source) {
            Ok(term) => Some(term),
            Err(message) => {
                self.emit_diagnostic(message.to_diagnostic());
                None
            }
        }
    }

    fn file_source(&self, file_id: FileId) -> Option<&str> {
        match self.files.source(file_id) {
            Ok(source) => Some(source),
            Err(error) => {
                self.emit_diagnostic(Diagnostic::bug().with_message(error.to_string()));
                None
            }
        }
    }

    fn emit_holes_and_infos(&self, elaborator: &mut Elaborator) {
        for hole in elaborator.take_holes() {
            self.emit_diagnostic(hole_to_diagnostic(&hole, self.emit_width));
        }
        for info in elaborator.take_infos() {
            self.emit_diagnostic(info_to_diagnostic(&info, self.emit_width));
        }
    }

    fn emit_the(&self, r#type: core::Term, expr: core::Term) {
        let term = core::Term::The(Arc::new(r#type), Arc::new(expr));
        self.emit_doc(pretty::Context::new().term(&term));
    }

    fn emit_doc(&self, doc: ::pretty::RcDoc<'static>) {
        let mut emit_writer = self.emit_writer.borrow_mut();
        let result = writeln!(emit_writer, "{}", doc.pretty(self.emit_width))
            .and_then(|()| emit_writer.flush());
        if let Err(error) = result {
            tracing::warn!(%error, "failed to write output");
        }
    }

    fn emit_diagnostic(&self, diagnostic: Diagnostic<FileId>) {
        let mut writer = self.diagnostic_writer.borrow_mut();
        let config = &self.codespan_config;

        let result = codespan_reporting::term::emit(&mut *writer, config, &self.files, &diagnostic)
            .map_err(|error| error.to_string())
            .and_then(|()| writer.flush().map_err(|error| error.to_string()));
        if let Err(error) = result {
            tracing::warn!(%error, "failed to write diagnostic");
        }

        if diagnostic.severity >= Severity::Error {
            *self.seen_errors.borrow_mut() = true;
        }
    }

    fn emit_read_diagnostic(&self, name: impl std::fmt::Display, error: std::io::Error) {
        let diagnostic =
            Diagnostic::error().with_message(format!("couldn't read `{name}`: {error}"));
        self.emit_diagnostic(diagnostic);
    }
}

/// The message carried by a panic, including the internal errors raised
/// during evaluation.
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(error) = payload.downcast_ref::<semantics::Error>() {
        error.description()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else {
        "unknown panic type"
    }
}

fn bug_diagnostic(message: &str, location: Option<&panic::Location<'_>>) -> Diagnostic<FileId> {
    Diagnostic::bug()
        .with_message(format!("pie panicked at '{message}'"))
        .with_notes(vec![
            match location {
                Some(location) => format!("panicked at: {location}"),
                None => "panicked at: unknown location".to_owned(),
            },
            "this is a bug in pie, not in the program being checked".to_owned(),
        ])
}

fn hole_to_diagnostic(hole: &Hole, width: usize) -> Diagnostic<FileId> {
    let pp = pretty::Context::new();
    let expected_type = pp.term(&hole.r#type).pretty(width).to_string();
    let context = (hole.context.iter())
        .map(|entry| format!("  {entry}"))
        .join("\n");

    let mut notes = vec![format!("expected type: {expected_type}")];
    if !context.is_empty() {
        notes.push(format!("context:\n{context}"));
    }

    Diagnostic::note()
        .with_message("unfilled hole")
        .with_labels(vec![Label::primary(hole.range.file_id(), hole.range)
            .with_message(format!("expected `{expected_type}`"))])
        .with_notes(notes)
}

fn info_to_diagnostic(info: &Info, width: usize) -> Diagnostic<FileId> {
    let found = pretty::Context::new().term(&info.r#type).pretty(width).to_string();
    Diagnostic::note()
        .with_message(format!("expression has type `{found}`"))
        .with_labels(vec![Label::primary(info.range.file_id(), info.range)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_are_reported_as_bugs() {
        let payload = panic::catch_unwind(|| {
            panic::panic_any(semantics::Error::InvalidReadBack);
        })
        .unwrap_err();

        let message = panic_message(payload.as_ref());
        assert_eq!(message, semantics::Error::InvalidReadBack.description());

        let diagnostic = bug_diagnostic(message, None);
        assert_eq!(diagnostic.severity, Severity::Bug);
        assert_eq!(diagnostic.message, format!("pie panicked at '{message}'"));
        assert_eq!(diagnostic.notes[0], "panicked at: unknown location");
    }

    #[test]
    fn string_panics_keep_their_message() {
        let payload = panic::catch_unwind(|| panic!("out of {}", "cheese")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "out of cheese");
    }
}
