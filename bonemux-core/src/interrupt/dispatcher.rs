//! Interrupt attach, detach and dispatch

use alloc::boxed::Box;

use bonemux_hal::{
    Board, Edge, EdgeSource, GpioLine, Interest, PinDescriptor, PinMap, Reactor, ReadyEvent,
};

use super::{AttachStatus, DetachStatus, EdgeEvent, EdgeHandler, Notification};
use crate::error::{Error, HwResultExt, Operation, Result};
use crate::registry::InterruptRegistration;
use crate::runtime::Runtime;

impl<M: PinMap, B: Board, R: Reactor> Runtime<M, B, R> {
    /// Arm a GPIO line with an edge handler
    ///
    /// The pin must have been put into a GPIO mode first. Failures while
    /// opening or subscribing the edge source are reported in the returned
    /// status rather than as an error; nothing is left registered.
    pub fn attach_interrupt(
        &self,
        pin: &str,
        edge: Edge,
        handler: impl EdgeHandler + 'static,
    ) -> Result<AttachStatus> {
        let pin = self.pin(pin)?;
        debug!("attach_interrupt({}, {})", pin.key, edge.as_str());

        let line = pin.gpio.ok_or(Error::NotConfigured { pin: pin.key })?;
        self.with_registry(|r| {
            if !r.gpio_allocated(line) {
                Err(Error::NotConfigured { pin: pin.key })
            } else if r.is_armed(line) {
                Err(Error::AlreadyArmed { pin: pin.key })
            } else {
                Ok(())
            }
        })
        .inspect_err(|e| warn!("{}", e))?;

        let status = match self.arm(&pin, line, edge, Box::new(handler)) {
            Ok(()) => AttachStatus {
                pin: pin.key,
                attached: true,
                error: None,
            },
            Err(e) => {
                error!("{}", e);
                AttachStatus {
                    pin: pin.key,
                    attached: false,
                    error: Some(e),
                }
            }
        };
        Ok(status)
    }

    fn arm(
        &self,
        pin: &PinDescriptor,
        line: GpioLine,
        edge: Edge,
        handler: Box<dyn EdgeHandler>,
    ) -> Result<()> {
        let mut source = self
            .board
            .open_edge_source(pin, edge)
            .during(pin.key, Operation::OpenEdgeSource)?;

        // Priming read clears the pending state left by opening the file
        let buffer = match self.board.read_edge(&mut source) {
            Ok(level) => level,
            Err(e) => {
                self.board.close_edge_source(source);
                return Err(Error::hardware(pin.key, Operation::ReadEdgeSource, e));
            }
        };

        let subscription = source.id();
        if let Err(e) = self.reactor.subscribe(subscription, line, Interest::Urgent) {
            self.board.close_edge_source(source);
            return Err(Error::hardware(pin.key, Operation::Subscribe, e));
        }

        let armed = self.with_registry(|r| {
            let generation = r.next_generation();
            r.arm(
                line,
                InterruptRegistration {
                    pin: pin.key,
                    source,
                    subscription,
                    buffer,
                    handler: Some(handler),
                    generation,
                },
            )
        });
        if let Err(registration) = armed {
            self.teardown(registration);
            return Err(Error::RegistryFull);
        }
        Ok(())
    }

    /// Disarm a GPIO line
    ///
    /// Detaching a line without a handler is not an error.
    pub fn detach_interrupt(&self, pin: &str) -> Result<DetachStatus> {
        let pin = self.pin(pin)?;
        debug!("detach_interrupt({})", pin.key);

        let removed = pin.gpio.and_then(|line| {
            self.with_registry(|r| {
                if r.gpio_allocated(line) {
                    r.disarm(line)
                } else {
                    None
                }
            })
        });
        let detached = match removed {
            Some(registration) => {
                self.teardown(registration);
                true
            }
            None => false,
        };
        Ok(DetachStatus {
            pin: pin.key,
            detached,
        })
    }

    /// Handle one readiness event
    ///
    /// Reads the line's current value and runs its handler. Returns the
    /// completion notification if the handler produced output. Events for
    /// lines that are no longer armed are ignored.
    pub fn dispatch_ready(&self, event: ReadyEvent) -> Result<Option<Notification>> {
        let line = event.token;
        let taken = self.with_registry(|r| {
            let reg = match r.interrupt_mut(line) {
                Some(reg) if reg.subscription == event.source => reg,
                _ => return Ok(None),
            };
            let value = self
                .board
                .read_edge(&mut reg.source)
                .during(reg.pin, Operation::ReadEdgeSource)?;
            reg.buffer = value;
            Ok(reg
                .handler
                .take()
                .map(|handler| (handler, reg.pin, value, reg.generation)))
        })?;

        let (mut handler, pin, value, generation) = match taken {
            Some(taken) => taken,
            None => {
                trace!("ignoring readiness on line {}", line);
                return Ok(None);
            }
        };

        let edge = EdgeEvent { pin, line, value };
        // Zero output counts as no output
        let notification = handler
            .on_edge(&edge)
            .filter(|&output| output != 0)
            .map(|output| Notification {
                pin,
                line,
                value,
                output,
            });
        if let Some(notification) = &notification {
            handler.on_complete(notification);
        }

        let stale = self.with_registry(|r| r.restore_handler(line, generation, handler));
        drop(stale);
        Ok(notification)
    }

    /// Wait for readiness events and dispatch them, forever
    pub async fn run_interrupts(&self) -> ! {
        info!("interrupt dispatch started");
        loop {
            let event = self.reactor.wait_ready().await;
            if let Err(e) = self.dispatch_ready(event) {
                error!("{}", e);
            }
        }
    }
}
