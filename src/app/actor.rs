//! App actor - message loop processing UI events and network responses

use tokio::sync::mpsc;

use crate::app::state::AppState;
use crate::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};

/// App actor that processes UI events and network responses
pub struct AppActor {
    state: AppState,
    network_tx: mpsc::UnboundedSender<NetworkCommand>,
    render_tx: mpsc::UnboundedSender<RenderState>,
}

impl AppActor {
    pub fn new(
        state: AppState,
        network_tx: mpsc::UnboundedSender<NetworkCommand>,
        render_tx: mpsc::UnboundedSender<RenderState>,
    ) -> Self {
        AppActor {
            state,
            network_tx,
            render_tx,
        }
    }

    /// Run the actor message loop
    pub async fn run(
        mut self,
        mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
        mut net_rx: mpsc::UnboundedReceiver<NetworkResponse>,
    ) {
        let cmds = self.state.start();
        self.send(cmds);
        let _ = self.render_tx.send(self.state.to_render_state());

        loop {
            tokio::select! {
                Some(event) = ui_rx.recv() => {
                    if self.handle_ui_event(event) {
                        let _ = self.network_tx.send(NetworkCommand::Shutdown);
                        break;
                    }
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                Some(response) = net_rx.recv() => {
                    let cmds = self.state.handle_response(response);
                    self.send(cmds);
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                else => break,
            }
        }
    }

    fn send(&self, cmds: Vec<NetworkCommand>) {
        for cmd in cmds {
            let _ = self.network_tx.send(cmd);
        }
    }

    /// Handle a UI event, returns true if quit was requested
    fn handle_ui_event(&mut self, event: UiEvent) -> bool {
        let cmds = match event {
            // Navigation
            UiEvent::NextTab => {
                self.state.next_tab();
                Vec::new()
            }
            UiEvent::PrevTab => {
                self.state.prev_tab();
                Vec::new()
            }
            UiEvent::SwitchTab(idx) => {
                self.state.switch_tab(idx);
                Vec::new()
            }
            UiEvent::SelectNext => {
                self.state.select_next();
                Vec::new()
            }
            UiEvent::SelectPrev => {
                self.state.select_prev();
                Vec::new()
            }
            UiEvent::Refresh => self.state.refresh(),

            // Form editing
            UiEvent::StartEditing => {
                self.state.start_editing();
                Vec::new()
            }
            UiEvent::StopEditing => {
                self.state.stop_editing();
                Vec::new()
            }
            UiEvent::CharInput(c) => {
                self.state.enter_char(c);
                Vec::new()
            }
            UiEvent::Backspace => {
                self.state.delete_char();
                Vec::new()
            }
            UiEvent::CursorLeft => {
                self.state.move_cursor_left();
                Vec::new()
            }
            UiEvent::CursorRight => {
                self.state.move_cursor_right();
                Vec::new()
            }
            UiEvent::NextField => {
                self.state.next_field();
                Vec::new()
            }
            UiEvent::PrevField => {
                self.state.prev_field();
                Vec::new()
            }
            UiEvent::Submit => self.state.submit(),

            // Landing
            UiEvent::ToggleAuthMode => {
                self.state.toggle_auth_mode();
                Vec::new()
            }
            UiEvent::CycleRole => {
                self.state.cycle_role();
                Vec::new()
            }

            // Orders
            UiEvent::PriceUp => {
                self.state.price_up();
                Vec::new()
            }
            UiEvent::PriceDown => {
                self.state.price_down();
                Vec::new()
            }
            UiEvent::NewOrder => {
                self.state.new_order();
                Vec::new()
            }
            UiEvent::AcceptOrder => self.state.accept_order(),
            UiEvent::AdvanceOrder => self.state.advance_order(),
            UiEvent::PayCash => self.state.pay_cash(),
            UiEvent::CompleteCash => self.state.complete_cash(),

            // Verification
            UiEvent::SendEmailCode => self.state.send_email_code(),
            UiEvent::EnterCode => {
                self.state.open_code_prompt();
                Vec::new()
            }
            UiEvent::UploadDocument(kind) => {
                self.state.open_document_prompt(kind);
                Vec::new()
            }

            // Admin
            UiEvent::ToggleUser => self.state.toggle_user(),
            UiEvent::ApproveDriver => self.state.approve_driver(),
            UiEvent::RejectDriver => {
                self.state.open_reject_prompt();
                Vec::new()
            }
            UiEvent::ProcessPayout => self.state.process_payout(),
            UiEvent::MarkCommissionPaid => self.state.mark_commission_paid(),

            // Prompt popup
            UiEvent::PromptChar(c) => {
                self.state.prompt_char(c);
                Vec::new()
            }
            UiEvent::PromptBackspace => {
                self.state.prompt_backspace();
                Vec::new()
            }
            UiEvent::PromptSubmit => self.state.prompt_submit(),
            UiEvent::PromptCancel => {
                self.state.prompt_cancel();
                Vec::new()
            }

            // Requests
            UiEvent::CancelRequests => self.state.cancel_requests(),

            // Popups
            UiEvent::ToggleHelp => {
                self.state.toggle_help();
                Vec::new()
            }
            UiEvent::CloseHelp => {
                self.state.close_help();
                Vec::new()
            }
            UiEvent::DismissNotice => {
                self.state.dismiss_notice();
                Vec::new()
            }

            // System
            UiEvent::Logout => self.state.logout(),
            UiEvent::Quit => return true,
        };

        self.send(cmds);
        false
    }
}
