/// Boot-mode flags (`boot -s`, `set boothowto -ad`).
///
/// Bit values match the kernel's `reboot.h`, so the mask is handed over
/// unchanged.
use core::fmt;

use super::{ArgError, Args, Context};

bitflags::bitflags! {
    /// Flags passed to the kernel at hand-off.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BootHowto: u32 {
        /// Ask for the root device name.
        const ASKNAME = 0x0001;
        const SINGLE  = 0x0002;
        /// Halt instead of rebooting.
        const HALT    = 0x0008;
        const KDB     = 0x0040;
        /// Enter the kernel's device configuration editor.
        const CONFIG  = 0x0400;
    }
}

/// Option letters in display order.
const LETTERS: [(char, BootHowto); 5] = [
    ('a', BootHowto::ASKNAME),
    ('b', BootHowto::HALT),
    ('c', BootHowto::CONFIG),
    ('s', BootHowto::SINGLE),
    ('d', BootHowto::KDB),
];

impl BootHowto {
    pub fn from_letter(c: char) -> Option<Self> {
        LETTERS.iter().find(|(l, _)| *l == c).map(|(_, flag)| *flag)
    }

    /// `self` with every flag named by `tokens` added. Each token must be
    /// `-` followed by option letters; a bare `-` adds nothing.
    pub fn parse<'t>(self, tokens: impl IntoIterator<Item = &'t str>) -> Result<Self, ArgError> {
        let mut howto = self;
        for tok in tokens {
            let letters = tok.strip_prefix('-').ok_or_else(|| ArgError::illegal(tok))?;
            for c in letters.chars() {
                howto |= Self::from_letter(c).ok_or(ArgError::BadOption(c))?;
            }
        }
        Ok(howto)
    }
}

/// `-` and the set letters, or nothing for an empty mask.
impl fmt::Display for BootHowto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        write!(f, "-")?;
        for (c, flag) in LETTERS {
            if self.contains(flag) {
                write!(f, "{}", c)?;
            }
        }
        Ok(())
    }
}

/// Parse flag tokens `args[from..]` into `ctx.howto`. The context only
/// changes if every token is valid.
pub fn bootparse(ctx: &mut Context, args: &Args<'_>, from: usize) -> Result<(), ArgError> {
    ctx.howto = ctx.howto.parse(args.rest(from).iter().copied())?;
    Ok(())
}
