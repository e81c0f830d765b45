//! Command table and console loop

use embedded_io::{ErrorType, Read, Write};

use crate::args::{tokenize, Args};
use crate::error::ConsoleError;
use crate::line::LineEditor;

/// Printed before each line of input
pub const PROMPT: &str = "? ";

/// Command implementation
///
/// Receives the console stream, the application context and the arguments
/// that followed the command name.
pub type Handler<S, Ctx> =
    fn(&mut S, &mut Ctx, &[&str]) -> Result<(), ConsoleError<<S as ErrorType>::Error>>;

/// One console command
pub struct Command<S: ErrorType, Ctx> {
    /// Matched case-insensitively
    pub name: &'static str,
    /// Exact number of arguments after the name
    pub arity: usize,
    /// One line shown by `help`
    pub help: &'static str,
    pub handler: Handler<S, Ctx>,
}

/// What happened to one line of input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// Blank line
    Empty,
    /// A command handler ran to completion
    Executed,
    /// The built-in `help` listing was printed
    Help,
    /// No command by that name
    Unknown,
    /// Wrong argument count or a rejected argument value
    InvalidArguments,
}

/// Commands known to a console, plus the built-in `help`
pub struct CommandTable<'c, S: ErrorType, Ctx> {
    commands: &'c [Command<S, Ctx>],
}

impl<'c, S: ErrorType, Ctx> CommandTable<'c, S, Ctx> {
    pub const fn new(commands: &'c [Command<S, Ctx>]) -> Self {
        Self { commands }
    }

    pub fn find(&self, name: &str) -> Option<&'c Command<S, Ctx>> {
        self.commands
            .iter()
            .find(|command| command.name.eq_ignore_ascii_case(name))
    }

    pub fn commands(&self) -> &'c [Command<S, Ctx>] {
        self.commands
    }
}

impl<S: Write, Ctx> CommandTable<'_, S, Ctx> {
    /// Run the command named by `args[0]` with the remaining arguments
    pub fn dispatch(
        &self,
        io: &mut S,
        ctx: &mut Ctx,
        args: &[&str],
    ) -> Result<Outcome, ConsoleError<S::Error>> {
        let Some((&name, rest)) = args.split_first() else {
            return Ok(Outcome::Empty);
        };

        if name.eq_ignore_ascii_case("help") {
            if !rest.is_empty() {
                return invalid_arguments(io, "help");
            }
            self.print_help(io)?;
            return Ok(Outcome::Help);
        }

        let Some(command) = self.find(name) else {
            write!(io, "Unknown Command: {name}\r\n")?;
            return Ok(Outcome::Unknown);
        };

        if rest.len() != command.arity {
            return invalid_arguments(io, command.name);
        }

        match (command.handler)(io, ctx, rest) {
            Ok(()) => Ok(Outcome::Executed),
            Err(ConsoleError::InvalidAngle) => {
                io.write_all(b"Invalid angle input\r\n")
                    .map_err(ConsoleError::Io)?;
                Ok(Outcome::InvalidArguments)
            }
            Err(e) => Err(e),
        }
    }

    fn print_help(&self, io: &mut S) -> Result<(), ConsoleError<S::Error>> {
        write!(io, "Command help  :  List every command\r\n")?;
        for command in self.commands {
            write!(io, "Command {}  :  {}\r\n", command.name, command.help)?;
        }
        Ok(())
    }
}

fn invalid_arguments<W: Write>(io: &mut W, name: &str) -> Result<Outcome, ConsoleError<W::Error>> {
    write!(
        io,
        "Invalid number of arguments to command '{name}', refer help for correct syntax\r\n"
    )?;
    Ok(Outcome::InvalidArguments)
}

/// Interactive console over a byte stream
///
/// `LEN` bounds the input line length.
pub struct Console<'c, S: ErrorType, Ctx, const LEN: usize> {
    io: S,
    table: CommandTable<'c, S, Ctx>,
    editor: LineEditor<LEN>,
}

impl<'c, S: Read + Write, Ctx, const LEN: usize> Console<'c, S, Ctx, LEN> {
    pub fn new(io: S, commands: &'c [Command<S, Ctx>]) -> Self {
        Self {
            io,
            table: CommandTable::new(commands),
            editor: LineEditor::new(),
        }
    }

    /// The underlying stream, for output outside a command
    pub fn io(&mut self) -> &mut S {
        &mut self.io
    }

    pub fn into_inner(self) -> S {
        self.io
    }

    /// Prompt, read one line and run it
    pub fn run_once(&mut self, ctx: &mut Ctx) -> Result<Outcome, ConsoleError<S::Error>> {
        self.io
            .write_all(PROMPT.as_bytes())
            .map_err(ConsoleError::Io)?;

        let line = self.editor.read_line(&mut self.io)?;
        let args: Args<'_> = tokenize(line);
        self.table.dispatch(&mut self.io, ctx, &args)
    }
}
