//! Typed mode letters for users and channels.

use std::fmt;

/// The argument/storage class of a channel mode letter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeClass {
    /// Type A: list entry (ban masks and friends). Takes a mask argument when
    /// changed; a bare `+b` is a list query.
    List,
    /// Type B: always takes a parameter (channel key).
    Param,
    /// Type C: takes a parameter only when set (user limit).
    ParamWhenSet,
    /// Type D: boolean flag, never takes a parameter.
    Flag,
    /// Membership prefix: grants a per-user channel status, argument is the
    /// target nickname.
    Prefix,
}

/// Trait shared by user and channel mode letters.
pub trait ModeType: fmt::Display + fmt::Debug + Clone + PartialEq {
    /// Whether the mode consumes an argument token in the given direction.
    fn takes_arg(&self, adding: bool) -> bool;

    /// Whether a missing argument is a list query rather than an error.
    fn is_list_mode(&self) -> bool;

    /// Parse a mode letter into its typed representation.
    fn from_char(c: char) -> Self;
}

/// User (umode) letters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[non_exhaustive]
pub enum UserMode {
    /// 'i' - invisible to WHO/NAMES outside shared channels.
    Invisible,
    /// 'w' - receives WALLOPS.
    Wallops,
    /// 'o' - IRC operator.
    Oper,
    /// 'r' - registered with services.
    Registered,
    /// 's' - receives server notices.
    ServerNotices,
    /// 'x' - cloaked hostname.
    MaskedHost,
    /// Any other letter, kept verbatim.
    Unknown(char),
}

impl UserMode {
    /// The wire letter for this mode.
    pub fn letter(self) -> char {
        match self {
            Self::Invisible => 'i',
            Self::Wallops => 'w',
            Self::Oper => 'o',
            Self::Registered => 'r',
            Self::ServerNotices => 's',
            Self::MaskedHost => 'x',
            Self::Unknown(c) => c,
        }
    }
}

impl ModeType for UserMode {
    fn takes_arg(&self, _adding: bool) -> bool {
        false
    }

    fn is_list_mode(&self) -> bool {
        false
    }

    fn from_char(c: char) -> Self {
        match c {
            'i' => Self::Invisible,
            'w' => Self::Wallops,
            'o' => Self::Oper,
            'r' => Self::Registered,
            's' => Self::ServerNotices,
            'x' => Self::MaskedHost,
            _ => Self::Unknown(c),
        }
    }
}

impl fmt::Display for UserMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Channel mode letters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[non_exhaustive]
pub enum ChannelMode {
    /// 'b' - ban mask list.
    Ban,
    /// 'e' - ban exception list.
    Exception,
    /// 'I' - invite exception list.
    InviteException,
    /// 'k' - channel key.
    Key,
    /// 'l' - user limit.
    Limit,
    /// 'i' - invite only.
    InviteOnly,
    /// 'm' - moderated.
    Moderated,
    /// 'n' - no external messages.
    NoExternal,
    /// 'p' - private.
    Private,
    /// 's' - secret.
    Secret,
    /// 't' - only ops change the topic.
    ProtectedTopic,
    /// 'q' - channel founder prefix (`~`).
    Founder,
    /// 'a' - channel admin prefix (`&`).
    Admin,
    /// 'o' - channel operator prefix (`@`).
    Oper,
    /// 'h' - half-operator prefix (`%`).
    Halfop,
    /// 'v' - voice prefix (`+`).
    Voice,
    /// Any other letter, treated as a flag.
    Unknown(char),
}

impl ChannelMode {
    /// The semantic class of this letter.
    pub fn class(self) -> ModeClass {
        match self {
            Self::Ban | Self::Exception | Self::InviteException => ModeClass::List,
            Self::Key => ModeClass::Param,
            Self::Limit => ModeClass::ParamWhenSet,
            Self::Founder | Self::Admin | Self::Oper | Self::Halfop | Self::Voice => {
                ModeClass::Prefix
            }
            _ => ModeClass::Flag,
        }
    }

    /// The wire letter for this mode.
    pub fn letter(self) -> char {
        match self {
            Self::Ban => 'b',
            Self::Exception => 'e',
            Self::InviteException => 'I',
            Self::Key => 'k',
            Self::Limit => 'l',
            Self::InviteOnly => 'i',
            Self::Moderated => 'm',
            Self::NoExternal => 'n',
            Self::Private => 'p',
            Self::Secret => 's',
            Self::ProtectedTopic => 't',
            Self::Founder => 'q',
            Self::Admin => 'a',
            Self::Oper => 'o',
            Self::Halfop => 'h',
            Self::Voice => 'v',
            Self::Unknown(c) => c,
        }
    }

    /// Resolve a NAMES prefix symbol (`~&@%+`) to its membership mode.
    pub fn from_prefix_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '~' => Some(Self::Founder),
            '&' => Some(Self::Admin),
            '@' => Some(Self::Oper),
            '%' => Some(Self::Halfop),
            '+' => Some(Self::Voice),
            _ => None,
        }
    }
}

impl ModeType for ChannelMode {
    fn takes_arg(&self, adding: bool) -> bool {
        match self.class() {
            ModeClass::List | ModeClass::Param | ModeClass::Prefix => true,
            ModeClass::ParamWhenSet => adding,
            ModeClass::Flag => false,
        }
    }

    fn is_list_mode(&self) -> bool {
        self.class() == ModeClass::List
    }

    fn from_char(c: char) -> Self {
        match c {
            'b' => Self::Ban,
            'e' => Self::Exception,
            'I' => Self::InviteException,
            'k' => Self::Key,
            'l' => Self::Limit,
            'i' => Self::InviteOnly,
            'm' => Self::Moderated,
            'n' => Self::NoExternal,
            'p' => Self::Private,
            's' => Self::Secret,
            't' => Self::ProtectedTopic,
            'q' => Self::Founder,
            'a' => Self::Admin,
            'o' => Self::Oper,
            'h' => Self::Halfop,
            'v' => Self::Voice,
            _ => Self::Unknown(c),
        }
    }
}

impl fmt::Display for ChannelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// One mode delta: direction, letter, and optional argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode<T: ModeType> {
    /// Mode being added (`+`).
    Plus(T, Option<String>),
    /// Mode being removed (`-`).
    Minus(T, Option<String>),
}

impl<T: ModeType> Mode<T> {
    /// The inner mode letter.
    pub fn mode(&self) -> &T {
        match self {
            Self::Plus(m, _) | Self::Minus(m, _) => m,
        }
    }

    /// The argument, if one was consumed.
    pub fn arg(&self) -> Option<&str> {
        match self {
            Self::Plus(_, arg) | Self::Minus(_, arg) => arg.as_deref(),
        }
    }

    /// Whether the delta adds the mode.
    pub fn is_plus(&self) -> bool {
        matches!(self, Self::Plus(..))
    }
}

impl<T: ModeType> fmt::Display for Mode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (sign, m, arg) = match self {
            Self::Plus(m, arg) => ('+', m, arg),
            Self::Minus(m, arg) => ('-', m, arg),
        };
        write!(f, "{sign}{m}")?;
        if let Some(a) = arg {
            write!(f, " {a}")?;
        }
        Ok(())
    }
}
