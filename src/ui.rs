pub fn render_index() -> &'static str {
    INDEX_HTML
}

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="ja">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>StudySheet</title>
  <style>
    :root {
      --bg: #f1f5f9;
      --ink: #1e293b;
      --muted: #64748b;
      --accent: #6366f1;
      --accent-soft: #e0e7ff;
      --card: #ffffff;
      --line: #e2e8f0;
      --ok: #0ea5e9;
      --shadow: 0 10px 30px rgba(30, 41, 59, 0.08);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Hiragino Sans", "Noto Sans JP", "Segoe UI", sans-serif;
      display: flex;
    }

    aside {
      width: 320px;
      flex-shrink: 0;
      background: var(--card);
      border-right: 1px solid var(--line);
      padding: 16px;
      display: flex;
      flex-direction: column;
      gap: 14px;
      height: 100vh;
      position: sticky;
      top: 0;
      overflow-y: auto;
      transition: width 200ms ease, padding 200ms ease;
    }

    aside.closed {
      width: 0;
      padding: 0;
      border: none;
      overflow: hidden;
    }

    main {
      flex: 1;
      min-width: 0;
    }

    header {
      background: var(--card);
      box-shadow: var(--shadow);
      padding: 14px 20px;
      display: flex;
      align-items: center;
      gap: 14px;
      position: sticky;
      top: 0;
      z-index: 2;
    }

    header h1 {
      margin: 0;
      font-size: 1.4rem;
      white-space: nowrap;
    }

    input, textarea, button {
      font: inherit;
    }

    input[type="text"], input[type="number"], input[type="date"], textarea {
      border: 1px solid var(--line);
      border-radius: 8px;
      padding: 6px 10px;
      background: #f8fafc;
      width: 100%;
    }

    #year-goal {
      font-size: 1.1rem;
      font-weight: 600;
    }

    button {
      border: 1px solid var(--line);
      background: var(--card);
      border-radius: 8px;
      padding: 6px 12px;
      cursor: pointer;
    }

    button.primary {
      background: var(--accent);
      border-color: var(--accent);
      color: white;
    }

    button:disabled {
      opacity: 0.6;
      cursor: wait;
    }

    .nav-item {
      display: flex;
      align-items: center;
      gap: 6px;
      padding: 4px 8px;
      border-radius: 8px;
      cursor: pointer;
    }

    .nav-item.selected {
      background: var(--accent);
      color: white;
    }

    .nav-item.current {
      outline: 2px solid var(--ok);
    }

    .nav-item input {
      background: transparent;
      border: none;
      color: inherit;
    }

    .content {
      padding: 24px;
      display: grid;
      gap: 18px;
      max-width: 960px;
      margin: 0 auto;
    }

    .card {
      background: var(--card);
      border-radius: 14px;
      box-shadow: var(--shadow);
      padding: 18px;
      display: grid;
      gap: 10px;
    }

    .card h2, .card h3 {
      margin: 0;
    }

    .row {
      display: flex;
      gap: 8px;
      align-items: center;
    }

    .row input[type="number"] {
      width: 110px;
    }

    .muted {
      color: var(--muted);
      font-size: 0.9rem;
    }

    .bar {
      height: 14px;
      background: var(--accent-soft);
      border-radius: 999px;
      overflow: hidden;
    }

    .bar div {
      height: 100%;
      background: var(--accent);
      transition: width 300ms ease;
    }

    .coach {
      background: var(--accent-soft);
      border-radius: 10px;
      padding: 10px 12px;
      white-space: pre-wrap;
    }
  </style>
</head>
<body>
  <aside id="sidebar">
    <label class="muted" for="start-date">記録開始日</label>
    <input id="start-date" type="date" />
    <h3>Menu</h3>
    <div class="nav-item" data-view="home">Home</div>
    <nav id="weeks"></nav>
    <h3>Data Management</h3>
    <a href="/api/export"><button>Export Data</button></a>
    <button id="import-button">Import Data</button>
    <input id="import-file" type="file" accept=".json" hidden />
  </aside>
  <main>
    <header>
      <button id="toggle-sidebar" aria-label="Toggle sidebar">&#9776;</button>
      <h1>StudySheet</h1>
      <input id="year-goal" type="text" placeholder="Set your ultimate goal for the year" />
    </header>
    <section class="content" id="view"></section>
  </main>

  <script>
    let sheet = null;
    let selectedView = 'home';
    const view = document.getElementById('view');

    const api = async (method, url, body, raw) => {
      const init = { method, headers: {} };
      if (body !== undefined) {
        init.body = raw ? body : JSON.stringify(body);
        init.headers['content-type'] = 'application/json';
      }
      const res = await fetch(url, init);
      if (!res.ok) {
        throw new Error((await res.text()) || 'Request failed');
      }
      return res.json();
    };

    const el = (tag, attrs = {}, children = []) => {
      const node = document.createElement(tag);
      Object.entries(attrs).forEach(([key, value]) => {
        if (key.startsWith('on')) {
          node.addEventListener(key.slice(2), value);
        } else if (key === 'text') {
          node.textContent = value;
        } else {
          node[key] = value;
        }
      });
      children.forEach((child) => node.append(child));
      return node;
    };

    const minutes = (value) => parseInt(value, 10) || 0;
    const weekday = (date) =>
      new Date(date + 'T00:00:00').toLocaleDateString('ja-JP', { weekday: 'short' });

    const renderSidebar = async () => {
      const today = await api('GET', '/api/today');
      document.getElementById('start-date').value = sheet.startDate;
      document.getElementById('year-goal').value = sheet.yearGoal;
      const nav = document.getElementById('weeks');
      nav.replaceChildren(...sheet.weeklyGoals.map((week) => {
        const item = el('div', {
          className: 'nav-item' + (selectedView === week.id ? ' selected' : '') +
            (week.id === today.weekId ? ' current' : ''),
          onclick: () => select(week.id),
        }, [
          el('strong', { text: '#' + week.id.replace('week', '') }),
          el('input', {
            type: 'text',
            value: week.title,
            placeholder: 'Set weekly goal',
            onclick: (event) => event.stopPropagation(),
            onchange: async (event) => {
              sheet = await api('PUT', `/api/weeks/${week.id}/title`, { title: event.target.value });
            },
          }),
        ]);
        return item;
      }));
      document.querySelector('[data-view="home"]').className =
        'nav-item' + (selectedView === 'home' ? ' selected' : '');
    };

    const renderHome = async () => {
      const today = await api('GET', '/api/today');
      const cards = [
        el('div', { className: 'card' }, [
          el('h3', { text: '年間目標' }),
          el('div', { text: today.yearGoal || '未設定' }),
        ]),
        el('div', { className: 'card' }, [
          el('h3', { text: '今週の目標' }),
          el('div', { text: (today.weeklyGoal && today.weeklyGoal.title) || '未設定' }),
        ]),
      ];
      if (today.log) {
        const tasks = today.log.tasks.length
          ? today.log.tasks.map((task) => el('li', {
            text: `${task.content || '未入力のタスク'}: 実績 ${task.actualMinutes}分 / 計画 ${task.plannedMinutes}分`,
          }))
          : [el('li', { text: '今日のタスクはまだありません。' })];
        cards.push(el('div', { className: 'card' }, [
          el('h3', { text: `今日の進捗 (${today.date})` }),
          el('div', { className: 'row muted' }, [
            el('span', { text: '実績 / 最高目標' }),
            el('span', { text: `${today.totals.actualMinutes} / ${today.log.bestGoal} 分` }),
          ]),
          el('div', { className: 'bar' }, [el('div', { style: `width: ${today.progressPercent}%` })]),
          el('ul', {}, tasks),
        ]));
      } else {
        cards.push(el('div', { className: 'card muted', text: '今日は記録期間外です。記録開始日を確認してください。' }));
      }
      view.replaceChildren(...cards);
    };

    const saveLog = async (log) => {
      await api('PUT', `/api/logs/${log.date}`, log);
      await renderWeek();
    };

    const dayCard = (day) => {
      const log = day.log;
      const taskRows = log.tasks.map((task) => el('div', { className: 'row' }, [
        el('input', {
          type: 'text', value: task.content, placeholder: '勉強内容',
          onchange: (event) => { task.content = event.target.value; saveLog(log); },
        }),
        el('input', {
          type: 'number', min: 0, value: task.plannedMinutes || '', placeholder: '計画(分)',
          onchange: (event) => { task.plannedMinutes = minutes(event.target.value); saveLog(log); },
        }),
        el('input', {
          type: 'number', min: 0, value: task.actualMinutes || '', placeholder: '実績(分)',
          onchange: (event) => { task.actualMinutes = minutes(event.target.value); saveLog(log); },
        }),
        el('button', {
          text: '削除', title: 'Delete task',
          onclick: async () => {
            await api('DELETE', `/api/logs/${log.date}/tasks/${encodeURIComponent(task.id)}`);
            await renderWeek();
          },
        }),
      ]));

      return el('div', { className: 'card' }, [
        el('h3', { text: `${log.date} (${weekday(log.date)})` }),
        el('div', { className: 'row' }, [
          el('label', { className: 'muted', text: 'ミニマム目標(分)' }),
          el('input', {
            type: 'number', min: 0, value: log.minGoal || '',
            onchange: (event) => { log.minGoal = minutes(event.target.value); saveLog(log); },
          }),
          el('label', { className: 'muted', text: 'ベスト目標(分)' }),
          el('input', {
            type: 'number', min: 0, value: log.bestGoal || '',
            onchange: (event) => { log.bestGoal = minutes(event.target.value); saveLog(log); },
          }),
        ]),
        ...taskRows,
        el('button', {
          text: 'タスクを追加',
          onclick: async () => {
            await api('POST', `/api/logs/${log.date}/tasks`);
            await renderWeek();
          },
        }),
        el('div', { className: 'muted', text: `合計: 計画 ${day.totals.plannedMinutes}分 / 実績 ${day.totals.actualMinutes}分` }),
        el('textarea', {
          rows: 2, value: log.comment,
          placeholder: '今日の学習で感じたこと、気づいたことなどを記録しましょう。',
          onchange: (event) => { log.comment = event.target.value; saveLog(log); },
        }),
        el('button', {
          className: 'primary',
          disabled: day.generating,
          text: day.generating ? 'コーチが考えています...' : 'AIコーチからフィードバックをもらう',
          onclick: async (event) => {
            event.target.disabled = true;
            event.target.textContent = 'コーチが考えています...';
            try {
              await api('POST', `/api/logs/${log.date}/coach`);
            } catch (err) {
              alert(err.message);
            }
            if (selectedView !== 'home') {
              await renderWeek();
            }
          },
        }),
        ...(log.aiCoachComment ? [el('div', { className: 'coach', text: log.aiCoachComment })] : []),
      ]);
    };

    const renderWeek = async () => {
      if (selectedView === 'home') {
        return;
      }
      const week = await api('GET', `/api/weeks/${selectedView}`);
      view.replaceChildren(
        el('div', { className: 'card' }, [
          el('h2', { text: `#${week.goal.id.replace('week', '')} ${week.goal.title || ''}` }),
          el('div', { className: 'muted', text: `週間合計: 計画 ${week.totals.plannedMinutes}分 / 実績 ${week.totals.actualMinutes}分` }),
        ]),
        ...week.days.map(dayCard),
      );
    };

    const select = async (id) => {
      selectedView = id;
      await renderSidebar();
      if (id === 'home') {
        await renderHome();
      } else {
        await renderWeek();
      }
    };

    const reload = async () => {
      sheet = await api('GET', '/api/sheet');
      await select('home');
    };

    document.querySelector('[data-view="home"]').addEventListener('click', () => select('home'));

    document.getElementById('year-goal').addEventListener('change', async (event) => {
      sheet = await api('PUT', '/api/year-goal', { yearGoal: event.target.value });
      if (selectedView === 'home') {
        await renderHome();
      }
    });

    document.getElementById('start-date').addEventListener('change', async (event) => {
      const confirmed = confirm('開始日を変更すると、すべてのログデータがリセットされます。よろしいですか？');
      if (!confirmed) {
        event.target.value = sheet.startDate;
        return;
      }
      try {
        sheet = await api('PUT', '/api/start-date', { startDate: event.target.value, confirm: true });
      } catch (err) {
        alert(err.message);
      }
      await select('home');
    });

    document.getElementById('toggle-sidebar').addEventListener('click', async () => {
      const sidebar = document.getElementById('sidebar');
      const state = await api('PUT', '/api/sidebar', { open: sidebar.classList.contains('closed') });
      sidebar.classList.toggle('closed', !state.open);
    });

    document.getElementById('import-button').addEventListener('click', () => {
      document.getElementById('import-file').click();
    });

    document.getElementById('import-file').addEventListener('change', async (event) => {
      const file = event.target.files[0];
      event.target.value = '';
      if (!file || !confirm('現在のデータを上書きして、選択したファイルをインポートしますか？')) {
        return;
      }
      try {
        sheet = await api('POST', '/api/import?confirm=true', await file.text(), true);
        await select('home');
      } catch (err) {
        alert(err.message);
      }
    });

    api('GET', '/api/sidebar')
      .then((state) => document.getElementById('sidebar').classList.toggle('closed', !state.open))
      .then(reload)
      .catch((err) => alert(err.message));
  </script>
</body>
</html>
"##;
