//! Window manager backed by the bridge's host window

use async_trait::async_trait;
use futures_util::future::{BoxFuture, FutureExt};
use std::time::Duration;

use bridge::{HostWindow, SaveDialog, StatusSource};
use crate::error::ShellResult;
use crate::traits::WindowManager;

#[async_trait]
impl<S, D> WindowManager for HostWindow<S, D>
where
    S: StatusSource + 'static,
    D: SaveDialog + 'static,
{
    async fn show_splash(&mut self) -> ShellResult<()> {
        HostWindow::show_splash(self).await?;
        Ok(())
    }

    async fn open_main(&mut self) -> ShellResult<()> {
        HostWindow::open_main(self).await?;
        Ok(())
    }

    async fn dismiss_splash(&mut self, min_display: Duration) {
        HostWindow::dismiss_splash(self, min_display).await
    }

    fn closed(&self) -> BoxFuture<'static, ()> {
        HostWindow::closed(self).boxed()
    }

    async fn destroy(&mut self) {
        HostWindow::destroy(self).await
    }
}
