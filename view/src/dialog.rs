//! 对话框状态机
//!
//! 成功：`Closed → Open → Submitting → Closed`；失败回到 `Open` 并附带错误信息；取消即 `Closed`。
//! 每次打开开启新会话，旧会话的响应不再改变对话框。

use crate::error::FieldErrors;
use crate::model::ProductForm;

/// 对话框会话标识
pub type SessionToken = u64;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum FormState {
    #[default]
    Closed,
    Open {
        form: ProductForm,
        errors: FieldErrors,
    },
    Submitting {
        form: ProductForm,
    },
}

/// 新建/编辑对话框，`target` 为正在编辑的产品
#[derive(Debug, Clone, Default)]
pub struct FormDialog {
    state: FormState,
    session: SessionToken,
    target: Option<i64>,
}

impl FormDialog {
    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn session(&self) -> SessionToken {
        self.session
    }

    pub fn target(&self) -> Option<i64> {
        self.target
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, FormState::Closed)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, FormState::Submitting { .. })
    }

    pub fn form(&self) -> Option<&ProductForm> {
        match &self.state {
            FormState::Open { form, .. } | FormState::Submitting { form } => Some(form),
            FormState::Closed => None,
        }
    }

    /// 仅在打开时可编辑，提交中不可修改
    pub fn form_mut(&mut self) -> Option<&mut ProductForm> {
        match &mut self.state {
            FormState::Open { form, .. } => Some(form),
            _ => None,
        }
    }

    pub fn errors(&self) -> Option<&FieldErrors> {
        match &self.state {
            FormState::Open { errors, .. } => Some(errors),
            _ => None,
        }
    }

    pub fn open(&mut self, form: ProductForm, target: Option<i64>) -> SessionToken {
        self.session += 1;
        self.target = target;
        self.state = FormState::Open {
            form,
            errors: FieldErrors::new(),
        };
        self.session
    }

    /// 丢弃草稿，进行中的请求随之失效
    pub fn cancel(&mut self) {
        self.session += 1;
        self.target = None;
        self.state = FormState::Closed;
    }

    /// 校验草稿：通过则进入 `Submitting`，否则保持 `Open` 并记录错误；未打开时返回 `None`
    pub fn begin_submit(&mut self) -> Option<Result<(SessionToken, ProductForm), FieldErrors>> {
        let FormState::Open { form, errors } = &mut self.state else {
            return None;
        };

        if let Err(field_errors) = form.check() {
            *errors = field_errors.clone();
            return Some(Err(field_errors));
        }

        let form = form.clone();
        self.state = FormState::Submitting { form: form.clone() };
        Some(Ok((self.session, form)))
    }

    /// 应用提交结果；`token` 属于旧会话时返回 `false` 且不改变状态
    pub fn finish(&mut self, token: SessionToken, errors: Option<FieldErrors>) -> bool {
        if token != self.session {
            return false;
        }
        let form = match std::mem::take(&mut self.state) {
            FormState::Submitting { form } => form,
            other => {
                self.state = other;
                return false;
            }
        };

        match errors {
            None => {
                self.target = None;
                self.state = FormState::Closed;
            }
            Some(errors) => {
                self.state = FormState::Open { form, errors };
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DeleteState {
    #[default]
    Closed,
    /// 等待确认，可在不关闭的情况下清除选择
    Open {
        pending: Option<i64>,
        error: Option<String>,
    },
    Submitting {
        id: i64,
    },
}

/// 删除确认对话框，选择与编辑目标相互独立
#[derive(Debug, Clone, Default)]
pub struct DeleteDialog {
    state: DeleteState,
    session: SessionToken,
}

impl DeleteDialog {
    pub fn state(&self) -> &DeleteState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, DeleteState::Closed)
    }

    pub fn pending(&self) -> Option<i64> {
        match self.state {
            DeleteState::Open { pending, .. } => pending,
            DeleteState::Submitting { id } => Some(id),
            DeleteState::Closed => None,
        }
    }

    pub fn open(&mut self, id: i64) -> SessionToken {
        self.session += 1;
        self.state = DeleteState::Open {
            pending: Some(id),
            error: None,
        };
        self.session
    }

    pub fn clear_selection(&mut self) {
        if let DeleteState::Open { pending, .. } = &mut self.state {
            *pending = None;
        }
    }

    pub fn cancel(&mut self) {
        self.session += 1;
        self.state = DeleteState::Closed;
    }

    /// 未打开或未选择时为 `None`
    pub fn begin_submit(&mut self) -> Option<(SessionToken, i64)> {
        let DeleteState::Open {
            pending: Some(id), ..
        } = self.state
        else {
            return None;
        };
        self.state = DeleteState::Submitting { id };
        Some((self.session, id))
    }

    pub fn finish(&mut self, token: SessionToken, error: Option<String>) -> bool {
        if token != self.session {
            return false;
        }
        let DeleteState::Submitting { id } = self.state else {
            return false;
        };

        self.state = match error {
            None => DeleteState::Closed,
            Some(error) => DeleteState::Open {
                pending: Some(id),
                error: Some(error),
            },
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_dialog_happy_path() {
        let mut dialog = FormDialog::default();
        assert!(!dialog.is_open());

        dialog.open(ProductForm::new("Chair", 50.0), None);
        let (token, form) = dialog.begin_submit().unwrap().unwrap();
        assert!(dialog.is_submitting());
        assert_eq!(form.name, "Chair");

        assert!(dialog.finish(token, None));
        assert_eq!(dialog.state(), &FormState::Closed);
    }

    #[test]
    fn test_form_dialog_validation_keeps_it_open() {
        let mut dialog = FormDialog::default();
        dialog.open(ProductForm::new("Chair", -5.0), None);

        let errors = dialog.begin_submit().unwrap().unwrap_err();
        assert!(errors.contains_key("price"));
        assert!(dialog.is_open());
        assert!(!dialog.is_submitting());
        assert!(dialog.errors().unwrap().contains_key("price"));

        dialog.form_mut().unwrap().price = 5.0;
        assert!(dialog.begin_submit().unwrap().is_ok());
    }

    #[test]
    fn test_stale_finish_is_ignored() {
        let mut dialog = FormDialog::default();
        dialog.open(ProductForm::new("Chair", 50.0), Some(1));
        let (old_token, _) = dialog.begin_submit().unwrap().unwrap();

        dialog.open(ProductForm::new("Desk", 150.0), Some(2));
        assert!(!dialog.finish(old_token, None));
        assert_eq!(dialog.target(), Some(2));
        assert_eq!(dialog.form().unwrap().name, "Desk");
    }

    #[test]
    fn test_begin_submit_when_closed() {
        let mut dialog = FormDialog::default();
        assert!(dialog.begin_submit().is_none());
    }

    #[test]
    fn test_delete_dialog_cleared_selection_submits_nothing() {
        let mut dialog = DeleteDialog::default();
        dialog.open(3);
        dialog.clear_selection();
        assert!(dialog.is_open());
        assert!(dialog.begin_submit().is_none());
    }

    #[test]
    fn test_delete_dialog_failure_reopens_with_error() {
        let mut dialog = DeleteDialog::default();
        dialog.open(3);
        let (token, id) = dialog.begin_submit().unwrap();
        assert_eq!(id, 3);

        assert!(dialog.finish(token, Some("network error".to_string())));
        assert_eq!(
            dialog.state(),
            &DeleteState::Open {
                pending: Some(3),
                error: Some("network error".to_string())
            }
        );
    }
}
