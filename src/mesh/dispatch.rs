//! Colour dispatch: local LEDs for the master, radio for everyone else.

use smart_leds::{SmartLedsWrite, RGB8};

use crate::block::{BlockRegistry, BlockStatus, Colour, MAX_BLOCKS};

use super::message::Message;
use super::radio::{DeliveryResult, Radio};

/// Pixels on the master's own strip.
pub const LED_COUNT: usize = 10;

/// How a failed colour send affects the block's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Leave the status alone; pacing sends are best effort.
    Ignore,
    /// Blink diagnostics: failure marks `Disconnected`, success `Blinking`.
    Blink,
}

/// What dispatching a colour did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The block already showed this colour.
    Unchanged,
    /// Rendered on the master's strip.
    Local,
    /// Recorded for a virtual block; nothing sent.
    Virtual,
    /// Sent over the radio.
    Sent(DeliveryResult),
    /// No block holds the number.
    Unknown,
}

impl DispatchOutcome {
    /// Whether the block's colour changed.
    pub fn changed(&self) -> bool {
        !matches!(self, DispatchOutcome::Unchanged | DispatchOutcome::Unknown)
    }
}

/// Fill the master's strip with one colour.
///
/// Returns `false` if the strip reported an error.
pub fn render_local<W>(strip: &mut W, colour: Colour) -> bool
where
    W: SmartLedsWrite<Color = RGB8>,
{
    strip
        .write(core::iter::repeat(colour.rgb()).take(LED_COUNT))
        .is_ok()
}

/// Command block `number` to show `colour` if it does not already.
pub fn dispatch_colour<R, W>(
    registry: &mut BlockRegistry,
    radio: &mut R,
    strip: &mut W,
    number: u8,
    colour: Colour,
    policy: FailurePolicy,
) -> DispatchOutcome
where
    R: Radio,
    W: SmartLedsWrite<Color = RGB8>,
{
    match registry.get(number) {
        None => DispatchOutcome::Unknown,
        Some(block) if block.colour == colour => DispatchOutcome::Unchanged,
        Some(_) => send_colour(registry, radio, strip, number, colour, policy),
    }
}

/// Command block `number` to show `colour` even if it already does.
pub fn send_colour<R, W>(
    registry: &mut BlockRegistry,
    radio: &mut R,
    strip: &mut W,
    number: u8,
    colour: Colour,
    policy: FailurePolicy,
) -> DispatchOutcome
where
    R: Radio,
    W: SmartLedsWrite<Color = RGB8>,
{
    let Some(block) = registry.get(number).copied() else {
        return DispatchOutcome::Unknown;
    };
    registry.set_colour(number, colour);

    if block.is_master() {
        render_local(strip, colour);
        return DispatchOutcome::Local;
    }
    if block.is_virtual() {
        return DispatchOutcome::Virtual;
    }

    let delivery = radio.send(&block.mac, &Message::colour_change(colour));
    if policy == FailurePolicy::Blink {
        let status = if delivery.is_delivered() {
            BlockStatus::Blinking
        } else {
            BlockStatus::Disconnected
        };
        registry.set_status(number, status);
    }
    DispatchOutcome::Sent(delivery)
}

/// Set every block to `colour` and push it to all of them.
///
/// Returns how many remote sends failed.
pub fn push_all<R, W>(
    registry: &mut BlockRegistry,
    radio: &mut R,
    strip: &mut W,
    colour: Colour,
) -> usize
where
    R: Radio,
    W: SmartLedsWrite<Color = RGB8>,
{
    let numbers: heapless::Vec<u8, MAX_BLOCKS> =
        registry.iter().map(|b| b.number).collect();
    numbers
        .iter()
        .map(|&n| send_colour(registry, radio, strip, n, colour, FailurePolicy::Ignore))
        .filter(|o| *o == DispatchOutcome::Sent(DeliveryResult::Failed))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Block, MacAddress};
    use crate::error::ProtocolError;

    #[derive(Default)]
    struct TestRadio {
        sent: std::vec::Vec<(MacAddress, Message)>,
        fail: bool,
    }

    impl Radio for TestRadio {
        fn send(&mut self, peer: &MacAddress, message: &Message) -> DeliveryResult {
            self.sent.push((*peer, *message));
            (!self.fail).into()
        }

        fn add_peer(&mut self, _peer: &MacAddress) -> Result<(), ProtocolError> {
            Ok(())
        }

        fn remove_peer(&mut self, _peer: &MacAddress) -> Result<(), ProtocolError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct TestStrip {
        frames: std::vec::Vec<std::vec::Vec<RGB8>>,
    }

    impl SmartLedsWrite for TestStrip {
        type Error = ();
        type Color = RGB8;

        fn write<T, I>(&mut self, iterator: T) -> Result<(), ()>
        where
            T: IntoIterator<Item = I>,
            I: Into<RGB8>,
        {
            self.frames.push(iterator.into_iter().map(Into::into).collect());
            Ok(())
        }
    }

    fn registry() -> BlockRegistry {
        let mut registry = BlockRegistry::new(MacAddress::new([0x24, 0, 0, 0, 0, 1]));
        registry
            .add(Block::physical(
                MacAddress::new([0xAA, 0, 0, 0, 0, 2]),
                2,
                BlockStatus::Working,
            ))
            .unwrap();
        registry.add(Block::placeholder(3)).unwrap();
        registry
    }

    #[test]
    fn test_master_renders_locally() {
        let mut registry = registry();
        let (mut radio, mut strip) = (TestRadio::default(), TestStrip::default());
        let outcome = dispatch_colour(
            &mut registry,
            &mut radio,
            &mut strip,
            1,
            Colour::Green,
            FailurePolicy::Ignore,
        );
        assert_eq!(outcome, DispatchOutcome::Local);
        assert_eq!(strip.frames[0].len(), LED_COUNT);
        assert!(strip.frames[0].iter().all(|&p| p == Colour::Green.rgb()));
        assert!(radio.sent.is_empty());
    }

    #[test]
    fn test_unchanged_colour_skipped() {
        let mut registry = registry();
        let (mut radio, mut strip) = (TestRadio::default(), TestStrip::default());
        let outcome = dispatch_colour(
            &mut registry,
            &mut radio,
            &mut strip,
            2,
            Colour::Off,
            FailurePolicy::Ignore,
        );
        assert_eq!(outcome, DispatchOutcome::Unchanged);
        assert!(radio.sent.is_empty());
    }

    #[test]
    fn test_virtual_never_sent() {
        let mut registry = registry();
        let (mut radio, mut strip) = (TestRadio::default(), TestStrip::default());
        let outcome = dispatch_colour(
            &mut registry,
            &mut radio,
            &mut strip,
            3,
            Colour::Red,
            FailurePolicy::Ignore,
        );
        assert_eq!(outcome, DispatchOutcome::Virtual);
        assert_eq!(registry.get(3).unwrap().colour, Colour::Red);
        assert!(radio.sent.is_empty());
    }

    #[test]
    fn test_blink_policy_sets_status() {
        let mut registry = registry();
        let (mut radio, mut strip) = (TestRadio::default(), TestStrip::default());
        send_colour(&mut registry, &mut radio, &mut strip, 2, Colour::Blue, FailurePolicy::Blink);
        assert_eq!(registry.get(2).unwrap().status, BlockStatus::Blinking);

        radio.fail = true;
        send_colour(&mut registry, &mut radio, &mut strip, 2, Colour::Off, FailurePolicy::Blink);
        assert_eq!(registry.get(2).unwrap().status, BlockStatus::Disconnected);
    }

    #[test]
    fn test_ignore_policy_keeps_status() {
        let mut registry = registry();
        let mut radio = TestRadio {
            fail: true,
            ..Default::default()
        };
        let mut strip = TestStrip::default();
        let failed = push_all(&mut registry, &mut radio, &mut strip, Colour::Off);
        assert_eq!(failed, 1);
        assert_eq!(registry.get(2).unwrap().status, BlockStatus::Working);
    }
}
