//! Decision Maker
//!
//! 各レベルで「どの子に降りるか / 止まるか」を決める外部協力者。
//! コアはこのインターフェースをデータの入出力としてのみ扱う。

use std::future::Future;

use crate::error::Result;

use super::types::{Decision, DecisionRequest};

/// 同期版の意思決定者
///
/// `Err`や候補外の名前はトラバーサル側で辞退として扱われる。
pub trait DecisionMaker {
    fn decide(&self, request: &DecisionRequest<'_>) -> Result<Decision>;
}

/// 非同期版の意思決定者
///
/// 呼び出しだけがノンブロッキングで、レベル間の処理は逐次。
pub trait AsyncDecisionMaker {
    fn decide(&self, request: &DecisionRequest<'_>) -> impl Future<Output = Result<Decision>>;
}

impl<T: DecisionMaker + ?Sized> DecisionMaker for &T {
    fn decide(&self, request: &DecisionRequest<'_>) -> Result<Decision> {
        (**self).decide(request)
    }
}

impl<T: DecisionMaker + ?Sized> DecisionMaker for Box<T> {
    fn decide(&self, request: &DecisionRequest<'_>) -> Result<Decision> {
        (**self).decide(request)
    }
}
