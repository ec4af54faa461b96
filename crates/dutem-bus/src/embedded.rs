//! Adapter for blocking `embedded-can` devices.

use dutem_frame::{CanFrame, STANDARD_ID_MAX};
use embedded_can::{blocking::Can, ExtendedId, Frame, Id, StandardId};

use crate::error::{BusError, Result};
use crate::traits::FrameSink;

/// Drives any [`embedded_can::blocking::Can`] device as a [`FrameSink`].
///
/// Identifiers above `0x7FF` are sent as 29-bit extended identifiers, the rest
/// as standard identifiers unless [`EmbeddedCanBus::force_extended`] is set.
#[derive(Debug)]
pub struct EmbeddedCanBus<C> {
    device: C,
    force_extended: bool,
}

impl<C: Can> EmbeddedCanBus<C> {
    pub fn new(device: C) -> Self {
        Self {
            device,
            force_extended: false,
        }
    }

    /// Always use the extended identifier format.
    pub fn force_extended(mut self, force: bool) -> Self {
        self.force_extended = force;
        self
    }

    /// Borrow the wrapped device.
    pub fn device(&self) -> &C {
        &self.device
    }

    /// Unwrap into the wrapped device.
    pub fn into_inner(self) -> C {
        self.device
    }

    fn to_id(&self, raw: u32) -> Result<Id> {
        if !self.force_extended && raw <= STANDARD_ID_MAX {
            return StandardId::new(raw as u16)
                .map(Id::Standard)
                .ok_or(BusError::InvalidId(raw));
        }
        ExtendedId::new(raw)
            .map(Id::Extended)
            .ok_or(BusError::InvalidId(raw))
    }
}

impl<C> FrameSink for EmbeddedCanBus<C>
where
    C: Can + Send,
{
    fn send(&mut self, frame: &CanFrame) -> Result<()> {
        let id = self.to_id(frame.id)?;
        let device_frame = C::Frame::new(id, frame.payload()).ok_or_else(|| {
            BusError::Device(format!("{}-byte payload rejected by device frame type", frame.len))
        })?;
        self.device.transmit(&device_frame).map_err(|err| {
            BusError::Device(format!("{:?}", embedded_can::Error::kind(&err)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct TestFrame {
        id: Id,
        data: Vec<u8>,
    }

    impl Frame for TestFrame {
        fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
            (data.len() <= 8).then(|| Self {
                id: id.into(),
                data: data.to_vec(),
            })
        }

        fn new_remote(_id: impl Into<Id>, _dlc: usize) -> Option<Self> {
            None
        }

        fn is_extended(&self) -> bool {
            matches!(self.id, Id::Extended(_))
        }

        fn is_remote_frame(&self) -> bool {
            false
        }

        fn id(&self) -> Id {
            self.id
        }

        fn dlc(&self) -> usize {
            self.data.len()
        }

        fn data(&self) -> &[u8] {
            &self.data
        }
    }

    #[derive(Default)]
    struct TestDevice {
        sent: Vec<TestFrame>,
        fail: bool,
    }

    impl Can for TestDevice {
        type Frame = TestFrame;
        type Error = embedded_can::ErrorKind;

        fn transmit(&mut self, frame: &Self::Frame) -> core::result::Result<(), Self::Error> {
            if self.fail {
                return Err(embedded_can::ErrorKind::Acknowledge);
            }
            self.sent.push(frame.clone());
            Ok(())
        }

        fn receive(&mut self) -> core::result::Result<Self::Frame, Self::Error> {
            Err(embedded_can::ErrorKind::Other)
        }
    }

    #[test]
    fn sensor_ids_go_out_extended() {
        let mut bus = EmbeddedCanBus::new(TestDevice::default());
        let frame = CanFrame::new(0x0CF6_0665, &[0xC4, 0x09, 0, 0, 0, 0, 30, 0]).unwrap();
        bus.send(&frame).unwrap();

        let sent = &bus.device().sent[0];
        assert!(sent.is_extended());
        assert_eq!(sent.id, Id::Extended(ExtendedId::new(0x0CF6_0665).unwrap()));
        assert_eq!(sent.data, frame.payload());
    }

    #[test]
    fn small_ids_use_standard_format_unless_forced() {
        let mut bus = EmbeddedCanBus::new(TestDevice::default());
        bus.send(&CanFrame::new(0x123, &[1]).unwrap()).unwrap();
        assert!(!bus.device().sent[0].is_extended());

        let mut forced = EmbeddedCanBus::new(TestDevice::default()).force_extended(true);
        forced.send(&CanFrame::new(0x123, &[1]).unwrap()).unwrap();
        assert!(forced.device().sent[0].is_extended());
    }

    #[test]
    fn out_of_range_id_is_rejected() {
        let mut bus = EmbeddedCanBus::new(TestDevice::default());
        let err = bus.send(&CanFrame::new(0x2000_0000, &[]).unwrap()).unwrap_err();
        assert!(matches!(err, BusError::InvalidId(0x2000_0000)));
    }

    #[test]
    fn device_errors_are_reported() {
        let device = TestDevice {
            fail: true,
            ..TestDevice::default()
        };
        let mut bus = EmbeddedCanBus::new(device);
        let err = bus.send(&CanFrame::new(0x0CF6_0665, &[]).unwrap()).unwrap_err();
        assert!(matches!(err, BusError::Device(msg) if msg == "Acknowledge"));
    }
}
